//! Closed enumerations for catalog identifiers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a wire id does not name any variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Enumeration the value was parsed into
    pub kind: &'static str,
    /// Offending input
    pub value: String,
}

/// Declares a closed enumeration with a wire id and a display label per variant.
macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($id:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Identifier used on the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $id),+
                }
            }

            /// Display label shown to the user.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($id => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

catalog_enum! {
    /// Exercise category.
    Category, "category" {
        /// Weights and machines
        Strength => ("strength", "Krafttraining"),
        Cardio => ("cardio", "Ausdauer"),
        Flexibility => ("flexibility", "Dehnung & Mobilität"),
        /// No equipment required
        Bodyweight => ("bodyweight", "Körpergewicht"),
        Rehabilitation => ("rehabilitation", "Rehabilitation"),
    }
}

catalog_enum! {
    /// Training goal of a plan or a user profile.
    Goal, "goal" {
        WeightLoss => ("weight_loss", "Gewichtsverlust"),
        MuscleGain => ("muscle_gain", "Muskelaufbau"),
        Mobility => ("mobility", "Mobilität"),
        Endurance => ("endurance", "Ausdauer"),
        Rehabilitation => ("rehabilitation", "Rehabilitation"),
    }
}

catalog_enum! {
    /// Exercise difficulty.
    Difficulty, "difficulty" {
        Beginner => ("beginner", "Anfänger"),
        Intermediate => ("intermediate", "Fortgeschritten"),
        Advanced => ("advanced", "Profi"),
    }
}

catalog_enum! {
    /// Joint a user can report problems with in the anamnesis.
    Joint, "joint" {
        Knee => ("knee", "Knie"),
        Hip => ("hip", "Hüfte"),
        Shoulder => ("shoulder", "Schulter"),
        Back => ("back", "Rücken"),
        Ankle => ("ankle", "Sprunggelenk"),
    }
}

catalog_enum! {
    /// Gender as entered in the user profile.
    Gender, "gender" {
        Male => ("male", "Männlich"),
        Female => ("female", "Weiblich"),
        Other => ("other", "Divers"),
    }
}

catalog_enum! {
    /// Self-reported training experience.
    ExperienceLevel, "experience level" {
        Beginner => ("beginner", "Anfänger"),
        Intermediate => ("intermediate", "Fortgeschritten"),
        Advanced => ("advanced", "Profi"),
    }
}

impl Goal {
    /// Short description shown next to the goal when generating a plan.
    pub fn description(&self) -> &'static str {
        match self {
            Goal::WeightLoss => "Fett verbrennen & Ausdauer steigern",
            Goal::MuscleGain => "Kraft & Muskelmasse aufbauen",
            Goal::Mobility => "Beweglichkeit & Flexibilität verbessern",
            Goal::Endurance => "Kondition & Herz-Kreislauf stärken",
            Goal::Rehabilitation => "Sanftes Training & Wiederherstellung",
        }
    }
}

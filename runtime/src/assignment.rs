// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Arm assignment with cookie stickiness.
//!
//! A visitor carrying a recognized `user-group` cookie always resolves to
//! the arm it names. Everyone else gets a fair coin flip and is marked as
//! new so the response composer sets the cookie.

use crate::cookie::{cookie_value, USER_GROUP};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

/// Which of the two experiment arms a visitor sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    /// First URL of the variant pair, cookie marker `group_one`.
    ArmA,
    /// Second URL of the variant pair, cookie marker `group_two`.
    ArmB,
}

impl Assignment {
    pub const ALL: [Assignment; 2] = [Assignment::ArmA, Assignment::ArmB];

    /// Cookie value stored for this arm.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::ArmA => "group_one",
            Self::ArmB => "group_two",
        }
    }

    /// Parse a cookie value. Anything other than the two markers is `None`.
    pub fn from_marker(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|arm| arm.marker() == value)
    }

    /// Position of this arm in the variant pair.
    pub const fn index(self) -> usize {
        match self {
            Self::ArmA => 0,
            Self::ArmB => 1,
        }
    }

    /// `Set-Cookie` value that pins a visitor to this arm.
    pub const fn set_cookie(self) -> &'static str {
        match self {
            Self::ArmA => "user-group=group_one; path=/",
            Self::ArmB => "user-group=group_two; path=/",
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group_one" | "a" | "arm_a" => Ok(Self::ArmA),
            "group_two" | "b" | "arm_b" => Ok(Self::ArmB),
            other => Err(format!(
                "unknown arm '{other}' (expected group_one or group_two)"
            )),
        }
    }
}

/// Source of the first-visit coin flip.
pub trait ArmPicker: Send + Sync {
    fn pick(&self) -> Assignment;
}

/// Map one fair coin flip from `rng` to an arm.
fn draw(rng: &mut impl Rng) -> Assignment {
    if rng.gen_bool(0.5) {
        Assignment::ArmB
    } else {
        Assignment::ArmA
    }
}

/// Unbiased draw from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl ArmPicker for RandomPicker {
    fn pick(&self) -> Assignment {
        draw(&mut rand::thread_rng())
    }
}

/// Unbiased draw from a caller-supplied RNG, e.g. a seeded one.
#[derive(Debug)]
pub struct RngPicker<R> {
    rng: Mutex<R>,
}

impl<R: Rng + Send> RngPicker<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: Rng + Send> ArmPicker for RngPicker<R> {
    fn pick(&self) -> Assignment {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        draw(&mut *rng)
    }
}

/// Always picks the same arm.
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub Assignment);

impl ArmPicker for FixedPicker {
    fn pick(&self) -> Assignment {
        self.0
    }
}

/// Outcome of resolving one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub assignment: Assignment,
    /// True when the arm was freshly drawn and the cookie must be set.
    pub is_new: bool,
}

impl Resolution {
    /// The `Set-Cookie` value to emit, if any.
    pub fn set_cookie(&self) -> Option<&'static str> {
        self.is_new.then(|| self.assignment.set_cookie())
    }
}

/// Resolve the arm for a request using the default random picker.
pub fn resolve_assignment(cookie_header: Option<&str>) -> Resolution {
    resolve_assignment_with(cookie_header, &RandomPicker)
}

/// Resolve the arm for a request, drawing from `picker` on a first visit.
pub fn resolve_assignment_with(cookie_header: Option<&str>, picker: &dyn ArmPicker) -> Resolution {
    let sticky = cookie_header
        .and_then(|header| cookie_value(header, USER_GROUP))
        .and_then(|value| Assignment::from_marker(&value));

    match sticky {
        Some(assignment) => Resolution {
            assignment,
            is_new: false,
        },
        None => Resolution {
            assignment: picker.pick(),
            is_new: true,
        },
    }
}

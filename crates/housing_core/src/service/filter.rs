//! House filter composition from raw UI input.
//!
//! # Invariants
//! - Blank owner text and blank/unparsable year text add no criterion.
//! - A year that does not parse is ignored, never reported as an error.
//! - Active criteria are ANDed.

use crate::model::{House, HouseFilter};
use crate::repo::{RepoResult, Repository};
use log::debug;
use serde::{Deserialize, Serialize};

/// Filter fields exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInput {
    pub owner: String,
    pub year_built: String,
    pub floors: Option<i32>,
}

impl FilterInput {
    pub fn to_filter(&self) -> HouseFilter {
        compose_filter(
            Some(self.owner.as_str()),
            Some(self.year_built.as_str()),
            self.floors,
        )
    }
}

/// Builds the conjunction of the criteria that are actually set.
pub fn compose_filter(
    owner_substring: Option<&str>,
    year_built: Option<&str>,
    floors: Option<i32>,
) -> HouseFilter {
    // Trimmed only to detect blank input; the needle keeps its whitespace.
    let owner_contains = owner_substring
        .filter(|owner| !owner.trim().is_empty())
        .map(str::to_string);

    HouseFilter {
        owner_contains,
        year_built: year_built.and_then(parse_year),
        floors,
    }
}

/// Runs `compose_filter` against the store.
pub fn search<S: Repository<House>>(
    store: &S,
    owner_substring: Option<&str>,
    year_built: Option<&str>,
    floors: Option<i32>,
) -> RepoResult<Vec<House>> {
    let filter = compose_filter(owner_substring, year_built, floors);
    store.fetch_where(&filter)
}

fn parse_year(text: &str) -> Option<i32> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<i32>() {
        Ok(year) => Some(year),
        Err(_) => {
            debug!(
                "event=house_filter module=service status=ignored criterion=year_built reason=parse_failure input_chars={}",
                trimmed.chars().count()
            );
            None
        }
    }
}

//! Shared test harness modules for the haulplan CLI.

use super::*;

mod helpers;

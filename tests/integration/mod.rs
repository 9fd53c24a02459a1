//! Integration tests that run whole experiments

mod reflectometry;
mod sanspol;
mod workflow;

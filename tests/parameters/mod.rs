//! Tests for the parameter system

mod parameter_set_tests;

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! This module contains property-based tests using proptest to verify
//! the functor laws and filter semantics of reactive pipelines.

mod pipeline_laws;

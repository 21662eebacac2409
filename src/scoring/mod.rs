//! Quality Scoring System
//!
//! Combines every finding of a validation run into one 100-point score.
//!
//! # Scoring Formula
//!
//! ```text
//! Total = Structure + Content + Efficiency + Security + Style   (clamped 0..=100)
//!
//! Where each category:
//!   Earned = clamp(pool - Σ penalty(severity), 0, pool)
//!
//! Except Style:
//!   Earned = max(0, voice_credit - Σ penalty(severity))
//!   voice_credit = pool     if imperative ratio >= full threshold
//!                  pool / 2 if imperative ratio >= partial threshold
//!                  0        otherwise
//! ```
//!
//! # Default Pools
//!
//! - Structure: 20 (structure + reference findings)
//! - Content: 30
//! - Efficiency: 20 (budget findings)
//! - Security: 15
//! - Style: 15
//!
//! # Severity Penalties
//!
//! - Critical: 10
//! - High: 6
//! - Medium: 4
//! - Low: 1
//! - Info: 0
//!
//! # Example
//!
//! A package with two medium content findings, 60% imperative sentences
//! (under a 70% full threshold) and nothing else:
//! Content = 30 - 2 × 4 = 22, Style = 15 / 2 = 7.5, Total = 84.5 (B).

mod scorer;
mod voice;

pub use scorer::{QualityReport, QualityScorer, ScoreArea, ScoreCategory};
pub use voice::{is_imperative, split_sentences, VoiceBand, VoiceStats};

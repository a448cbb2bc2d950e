//! Duofarm: reward farming engine for the Duolingo API.
//!
//! Authenticates with a caller-supplied bearer token, reads the account
//! snapshot, and issues request sequences shaped like completed learning
//! activity to claim gems, XP or streak credit.
//!
//! # Architecture
//!
//! Data flows strictly downward:
//! - **Token reader** ([`token`]): payload-only JWT decode + expiry check
//! - **Client** ([`client`]): the four remote calls (snapshot, gem claim,
//!   session create+finalize, story completion)
//! - **Payload tables** ([`payload`]): magnitude → payload-delta lookup
//! - **Farm** ([`farm`]): one [`ClaimableReward`] per family, composed by
//!   the [`Farmer`] into single attempts
//! - **Batch** ([`batch`]): staggered bounded repetition with an aggregate
//!   report
//! - **Runner** ([`runner`]): unbounded repetition under cooperative
//!   cancellation with live statistics
//!
//! Single attempts, batches and continuous runs all go through the same
//! [`Farmer`]; it is the only component that touches the network client.

pub mod account;
pub mod batch;
pub mod client;
pub mod error;
pub mod farm;
pub mod payload;
pub mod runner;
pub mod token;

pub use account::{AccountSnapshot, find_skill_id};
pub use batch::{AttemptOutcome, BatchReport, DEFAULT_STAGGER, run_batch};
pub use client::DuolingoClient;
pub use error::{FarmError, Result};
pub use farm::{
    AttemptReport, ClaimableReward, FarmOutcome, FarmRequest, Farmer, GemReward, RewardFamily,
    SessionReward, StoryReward, StreakReward, farm, streak_window,
};
pub use runner::{ContinuousRunner, RoundLimit, RunSnapshot, RunState};
pub use token::Identity;

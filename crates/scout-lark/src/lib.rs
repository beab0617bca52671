//! Lark-style notification cards and their delivery paths: a
//! fire-and-forget webhook and a tenant-token-authenticated messaging API.

mod cards;
mod client;

pub use cards::{
    build_daily_digest_card, build_issue_card, build_plan_card, header_color, DigestProject,
    DigestRecommendation,
};
pub use client::{LarkClient, LarkError, Notifier, Recipient};

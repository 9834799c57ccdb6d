//! Durable storage for synthesized audio

pub mod s3;

pub use s3::{AudioStore, S3AudioStore, website_url};

//! Shared test support and service-level tests:
//! - canned watch-page and timed-text payloads
//! - a scripted fetcher standing in for the network
//! - end-to-end scenarios through `TranscriptService`

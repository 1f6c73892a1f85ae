//! End-to-end tests for netbot live under `tests/`.
//!
//! They wire the real parser, dispatcher, poll loop and RESTCONF/Webex
//! clients against `wiremock` servers and the in-memory device mocks.

//! Integration tests for fieldsync-api
//!
//! Uses wiremock to simulate the survey-data server and verifies
//! end-to-end behavior of the REST client and the port adapter,
//! including error classification.

mod common;

mod test_fetch;

// End-to-end tests for langlearn-polly
//
// The service tests drive TtsService against an in-process fake repository
// that returns real MP3 bytes, so merging, file naming and ordering are
// exercised without AWS. The CLI tests run the compiled binary and only
// cover paths that fail or finish before a Polly client is built.

mod helpers;
mod test_cli;
mod test_pair;

//! Tests for history, stats, checksum.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use grab_core::checksum::DigestAlgorithm;
use std::path::PathBuf;

#[test]
fn cli_parse_history() {
    match parse(&["grab", "history"]) {
        CliCommand::History { limit } => assert!(limit.is_none()),
        _ => panic!("expected History"),
    }
    match parse(&["grab", "history", "--limit", "5"]) {
        CliCommand::History { limit } => assert_eq!(limit, Some(5)),
        _ => panic!("expected History"),
    }
}

#[test]
fn cli_parse_stats() {
    match parse(&["grab", "stats"]) {
        CliCommand::Stats => {}
        _ => panic!("expected Stats"),
    }
}

#[test]
fn cli_parse_checksum_defaults_to_md5() {
    match parse(&["grab", "checksum", "/path/to/file.bin"]) {
        CliCommand::Checksum { path, algorithm } => {
            assert_eq!(path, PathBuf::from("/path/to/file.bin"));
            assert_eq!(algorithm, DigestAlgorithm::Md5);
        }
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_checksum_sha256() {
    match parse(&["grab", "checksum", "f.bin", "--algorithm", "sha256"]) {
        CliCommand::Checksum { algorithm, .. } => assert_eq!(algorithm, DigestAlgorithm::Sha256),
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_checksum_rejects_unknown_algorithm() {
    assert!(Cli::try_parse_from(["grab", "checksum", "f.bin", "--algorithm", "crc32"]).is_err());
}

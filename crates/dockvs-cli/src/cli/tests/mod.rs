//! CLI parse tests and command tests against a local catalog server.

use super::container::ContainerTool;
use super::{Cli, CliCommand};
use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

/// Records container tool invocations instead of running docker.
#[derive(Default)]
struct RecordingTool {
    calls: RefCell<Vec<Vec<String>>>,
}

impl RecordingTool {
    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }
}

impl ContainerTool for RecordingTool {
    fn run(&self, args: &[String]) -> Result<()> {
        self.calls.borrow_mut().push(args.to_vec());
        Ok(())
    }
}

#[allow(dead_code)]
#[path = "../../../../dockvs-core/tests/common/catalog_server.rs"]
mod catalog_server;

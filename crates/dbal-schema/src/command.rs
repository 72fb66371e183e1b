//! The blueprint command log.

use std::fmt;

use dbal_core::Error;

use crate::column::Column;
use crate::index::{Index, Primary};

/// Callback run once a command has been applied, with its error if any.
pub type Callback = Box<dyn FnMut(Option<&Error>) + Send>;

/// One recorded schema change.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    AddColumn(Column),
    ModifyColumn(Column),
    RenameColumn { from: String, to: String },
    DropColumn(String),
    CreateIndex(Index),
    DropIndex(String),
    RenameIndex { from: String, to: String },
    CreatePrimary(Primary),
    /// Carries the constraint name to drop.
    DropPrimary(String),
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::AddColumn(_) => "AddColumn",
            CommandKind::ModifyColumn(_) => "ModifyColumn",
            CommandKind::RenameColumn { .. } => "RenameColumn",
            CommandKind::DropColumn(_) => "DropColumn",
            CommandKind::CreateIndex(_) => "CreateIndex",
            CommandKind::DropIndex(_) => "DropIndex",
            CommandKind::RenameIndex { .. } => "RenameIndex",
            CommandKind::CreatePrimary(_) => "CreatePrimary",
            CommandKind::DropPrimary(_) => "DropPrimary",
        }
    }

    /// Commands a CREATE TABLE statement consumes; the rest only apply to ALTER.
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            CommandKind::AddColumn(_) | CommandKind::CreateIndex(_) | CommandKind::CreatePrimary(_)
        )
    }
}

pub struct Command {
    pub kind: CommandKind,
    callback: Option<Callback>,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            callback: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn set_callback(&mut self, callback: Callback) {
        self.callback = Some(callback);
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Report the outcome to the callback, at most once.
    pub fn complete(&mut self, error: Option<&Error>) {
        if let Some(mut callback) = self.callback.take() {
            callback(error);
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("kind", &self.kind)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

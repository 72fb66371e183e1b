//! Query state: clauses plus their bindings.

use dbal_core::Value;

use crate::clause::{FromClause, Having, Join, Lock, OrderBy, Where};
use crate::expr::Selectable;

/// The clause a binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSection {
    Select,
    From,
    Join,
    Where,
    Group,
    Having,
    Order,
}

/// Bindings kept per section so they flatten in textual clause order no
/// matter in which order the builder methods were called.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub select: Vec<Value>,
    pub from: Vec<Value>,
    pub join: Vec<Value>,
    pub where_: Vec<Value>,
    pub group: Vec<Value>,
    pub having: Vec<Value>,
    pub order: Vec<Value>,
}

impl Bindings {
    pub fn section_mut(&mut self, section: BindingSection) -> &mut Vec<Value> {
        match section {
            BindingSection::Select => &mut self.select,
            BindingSection::From => &mut self.from,
            BindingSection::Join => &mut self.join,
            BindingSection::Where => &mut self.where_,
            BindingSection::Group => &mut self.group,
            BindingSection::Having => &mut self.having,
            BindingSection::Order => &mut self.order,
        }
    }

    /// Flatten every section in clause order.
    pub fn all(&self) -> Vec<Value> {
        self.select
            .iter()
            .chain(&self.from)
            .chain(&self.join)
            .chain(&self.where_)
            .chain(&self.group)
            .chain(&self.having)
            .chain(&self.order)
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.select.is_empty()
            && self.from.is_empty()
            && self.join.is_empty()
            && self.where_.is_empty()
            && self.group.is_empty()
            && self.having.is_empty()
            && self.order.is_empty()
    }
}

/// A SELECT under construction. `Clone` is a deep copy.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub from: Option<FromClause>,
    pub columns: Vec<Selectable>,
    pub distinct: bool,
    pub joins: Vec<Join>,
    pub wheres: Vec<Where>,
    pub groups: Vec<String>,
    pub havings: Vec<Having>,
    pub orders: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub lock: Option<Lock>,
    pub bindings: Bindings,
    /// Inputs the builder had to repair or skip; fatal in strict mode
    pub issues: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// All bindings flattened in clause order.
    pub fn bindings(&self) -> Vec<Value> {
        self.bindings.all()
    }

    pub fn add_bindings(&mut self, section: BindingSection, values: impl IntoIterator<Item = Value>) {
        self.bindings.section_mut(section).extend(values);
    }

    /// The table name of a plain table source.
    pub fn table_name(&self) -> Option<&str> {
        self.from.as_ref().and_then(FromClause::table_name)
    }
}

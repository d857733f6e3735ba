//! The `aragonos` module: acting on Aragon DAOs.
//!
//! `connect` opens a block in which the DAO's kernel and apps resolve by
//! name and `aragonos` commands need no qualifier. Commands load lazily,
//! the first time a script uses them.

mod act;
mod connect;

use std::sync::Arc;

use crisp_eval::{Address, Command, Module, ModuleContext, Value};

pub use connect::ConnectedDao;

pub const NAME: &str = "aragonos";

/// Permission manager wildcard for "any entity".
pub const ANY_ENTITY: Address = Address::new([0xff; 20]);

/// Permission manager sentinel for burned permissions.
pub const BURN_ENTITY: Address = Address::new([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xde, 0xad,
]);

/// A DAO is given by address or by its `.eth` name.
fn is_dao(value: &Value) -> bool {
    match value {
        Value::Address(_) => true,
        Value::String(name) => name.ends_with(".eth"),
        _ => false,
    }
}

pub fn module(context: ModuleContext) -> Module {
    Module::new(NAME, context)
        .with_lazy_command("connect", || async {
            let command: Arc<dyn Command> = Arc::new(connect::Connect);
            command
        })
        .with_lazy_command("act", || async {
            let command: Arc<dyn Command> = Arc::new(act::Act);
            command
        })
        .with_type("dao", is_dao)
        .with_constant("ANY_ENTITY", Value::Address(ANY_ENTITY))
        .with_constant("BURN_ENTITY", Value::Address(BURN_ENTITY))
}

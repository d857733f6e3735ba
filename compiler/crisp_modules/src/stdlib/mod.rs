//! The `std` module: loading modules, variables, transactions and output.
//!
//! Every interpreter starts with `std` loaded, so its commands resolve
//! unqualified everywhere.

mod batch;
mod exec;
mod helpers;
mod load;
mod print;
mod set;
mod switch;

use crisp_eval::{Module, ModuleContext};

pub const NAME: &str = "std";

pub fn module(context: ModuleContext) -> Module {
    let load = load::Load::new(&context);
    Module::new(NAME, context)
        .with_command("load", load)
        .with_command("set", set::Set)
        .with_command("exec", exec::Exec)
        .with_command("raw", exec::Raw)
        .with_command("print", print::Print)
        .with_command("switch", switch::Switch)
        .with_command("batch", batch::Batch)
        .with_helper("me", helpers::Me)
        .with_helper("id", helpers::Id)
        .with_helper("get", helpers::Get)
}

#[cfg(test)]
mod tests;

//! Context handed to command and helper implementations.

use std::sync::Arc;

use crisp_ir::{Location, Node};

use super::{BlockScope, Module};
use crate::abi::FunctionFragment;
use crate::actions::Action;
use crate::bindings::SharedBindings;
use crate::context::{ChainClient, EvalMode, ModuleContext, ScriptLogger};
use crate::errors::EvalResult;
use crate::interpreter::Interpreter;
use crate::value::{Address, Value};

/// What a running command or helper can reach.
pub struct CallContext<'a> {
    pub interpreter: &'a Interpreter,
    pub module: &'a Module,
    /// Qualified name of the running command or helper.
    pub name: &'a str,
    pub loc: Option<Location>,
}

pub type CommandContext<'a> = CallContext<'a>;
pub type HelperContext<'a> = CallContext<'a>;

impl CallContext<'_> {
    pub fn bindings(&self) -> &SharedBindings {
        self.interpreter.bindings()
    }

    pub fn context(&self) -> &ModuleContext {
        self.interpreter.context()
    }

    pub fn mode(&self) -> EvalMode {
        self.context().mode
    }

    pub fn is_eager(&self) -> bool {
        self.mode().is_eager()
    }

    pub fn client(&self) -> EvalResult<&Arc<dyn ChainClient>> {
        self.context().client()
    }

    pub fn logger(&self) -> &ScriptLogger {
        &self.context().logger
    }

    /// Chain id from the client; `None` during eager evaluation.
    pub async fn chain_id(&self) -> EvalResult<Option<u64>> {
        if self.is_eager() {
            return Ok(None);
        }
        Ok(Some(self.client()?.chain_id().await?))
    }

    /// Sending account; `None` during eager evaluation.
    pub async fn signer(&self) -> EvalResult<Option<Address>> {
        if self.is_eager() {
            return Ok(None);
        }
        Ok(Some(self.client()?.signer().await?))
    }

    /// Evaluate a nested node.
    pub async fn interpret(&self, node: &Node) -> EvalResult<Value> {
        self.interpreter.interpret_node(node).await
    }

    /// Run `block` inside a new scope set up from `scope`.
    pub async fn interpret_block(
        &self,
        block: &Node,
        scope: BlockScope,
    ) -> EvalResult<Vec<Action>> {
        self.interpreter.interpret_block(block, scope).await
    }

    pub fn load_module(&self, name: &str, alias: Option<&str>) -> EvalResult<Arc<Module>> {
        self.interpreter.load_module(name, alias)
    }

    /// Parse `signature`, cached in the ABI namespace.
    pub fn fragment(&self, signature: &str) -> EvalResult<Arc<FunctionFragment>> {
        self.interpreter.fragment(signature)
    }
}

//! Value-producing nodes.

use tracing::{trace_span, Instrument};

use crisp_ir::{CallExpression, HelperFunctionExpression, Node, NodeKind};
use num_traits::Signed;

use super::{arith, Interpreter};
use crate::bindings::{Binding, BindingValue, Namespace};
use crate::errors::{invalid, undefined_variable, EvalResult};
use crate::module::{process_helper_args, CallContext};
use crate::value::{number_from_parts, Address, Value};
use crate::BoxFuture;

impl Interpreter {
    /// Evaluate a value-producing node. Failures are tagged with the node
    /// unless an inner node already claimed them.
    pub fn interpret_node<'a>(&'a self, node: &'a Node) -> BoxFuture<'a, EvalResult<Value>> {
        Box::pin(async move {
            self.eval_node(node)
                .await
                .map_err(|e| e.in_node(node.kind_name(), node.name(), node.loc))
        })
    }

    async fn eval_node(&self, node: &Node) -> EvalResult<Value> {
        match &node.kind {
            NodeKind::AddressLiteral(text) => text
                .parse::<Address>()
                .map(Value::Address)
                .map_err(|e| invalid(e.to_string())),
            NodeKind::BoolLiteral(b) => Ok(Value::Bool(*b)),
            NodeKind::BytesLiteral(text) => parse_bytes(text),
            NodeKind::NumberLiteral(parts) => number_from_parts(parts).map(Value::Number),
            NodeKind::StringLiteral(s) | NodeKind::Bareword(s) => Ok(Value::String(s.clone())),
            NodeKind::VariableIdentifier(name) => self.resolve_variable(name),
            NodeKind::ProbableIdentifier(name) => Ok(self.resolve_identifier(name)),
            NodeKind::HelperFunctionExpression(helper) => self.interpret_helper(node, helper).await,
            NodeKind::CallExpression(call) => self.interpret_call(call).await,
            NodeKind::BinaryExpression(bin) => {
                let left = self.interpret_node(&bin.left).await?;
                let right = self.interpret_node(&bin.right).await?;
                arith::apply(bin.op, left, right)
            }
            NodeKind::AsExpression(_) => Err(invalid(
                "`as` is only allowed where a command expects an alias",
            )),
            NodeKind::CommandExpression(_) => Err(invalid("a command cannot be used as a value")),
            NodeKind::BlockExpression(_) => Err(invalid("a block cannot be used as a value")),
        }
    }

    /// `$name` from `USER`. An unresolved binding is a placeholder while
    /// evaluating eagerly.
    fn resolve_variable(&self, name: &str) -> EvalResult<Value> {
        let store = self.bindings.read();
        match store.get_binding(name, Namespace::User) {
            None => Err(undefined_variable(name)),
            Some(Binding {
                value: Some(BindingValue::Value(v)),
                ..
            }) => Ok(v.clone()),
            Some(Binding { value: None, .. }) if self.mode().is_eager() => Ok(Value::Placeholder),
            Some(_) => Err(invalid(format!("variable `{name}` has no value"))),
        }
    }

    /// `ADDR` bindings first, then data providers, else the text itself.
    fn resolve_identifier(&self, name: &str) -> Value {
        let store = self.bindings.read();
        if let Some(binding) = store.get_binding(name, Namespace::Addr) {
            match &binding.value {
                Some(BindingValue::Value(v)) => return v.clone(),
                None => return Value::Placeholder,
                Some(_) => {}
            }
        }
        for provider in store.data_providers() {
            if let Some(address) = provider.resolve(name) {
                return Value::Address(address);
            }
        }
        Value::String(name.to_string())
    }

    async fn interpret_helper(
        &self,
        node: &Node,
        expr: &HelperFunctionExpression,
    ) -> EvalResult<Value> {
        let name = expr.name.as_str();
        async {
            let (module, helper) = self.find_helper(name).await?;
            if self.mode().is_eager() && !helper.is_pure() {
                return Ok(Value::Placeholder);
            }
            let args = process_helper_args(self, &module, name, helper.as_ref(), &expr.args).await?;
            let ctx = CallContext {
                interpreter: self,
                module: &module,
                name,
                loc: node.loc,
            };
            helper.run(&module, args, &ctx).await
        }
        .instrument(trace_span!("helper", name))
        .await
        .map_err(|e| e.in_helper(name, node.loc))
    }

    /// `target::method(args)`: a contract read with parameter types taken
    /// from the argument values.
    async fn interpret_call(&self, call: &CallExpression) -> EvalResult<Value> {
        let target = self.interpret_node(&call.target).await?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.interpret_node(arg).await?);
        }
        if self.mode().is_eager() || target.is_placeholder() {
            return Ok(Value::Placeholder);
        }
        let Value::Address(to) = target else {
            return Err(invalid(format!(
                "cannot call `{}` on a {} value",
                call.method,
                target.type_name()
            )));
        };

        let types = args
            .iter()
            .map(infer_param_type)
            .collect::<EvalResult<Vec<_>>>()?;
        let fragment = self.fragment(&format!("{}({})", call.method, types.join(",")))?;
        let data = fragment.encode_call(&args)?;
        let output = self.context.client()?.call(to, &data).await?;
        fragment.decode_output(&output)
    }
}

fn infer_param_type(value: &Value) -> EvalResult<&'static str> {
    Ok(match value {
        Value::Address(_) => "address",
        Value::Bool(_) => "bool",
        Value::Bytes(_) => "bytes",
        Value::Number(n) if n.is_negative() => "int256",
        Value::Number(_) | Value::Placeholder => "uint256",
        Value::String(_) => "string",
        Value::List(_) => {
            return Err(invalid(
                "list arguments need an explicit signature; use @get instead",
            ))
        }
    })
}

fn parse_bytes(text: &str) -> EvalResult<Value> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits)
        .map(Value::Bytes)
        .map_err(|_| invalid(format!("`{text}` is not an even-length hex string")))
}

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crisp_eval::errors::invalid;
use crisp_eval::{
    Action, Address, ArgDef, ArgType, Binding, BindingValue, BlockScope, CallContext, Command,
    DataProvider, EvalResult, Module, Namespace, ResolvedArgs, Value,
};

use super::NAME;

/// Binding name of the provider a `connect` block pushes.
const PROVIDER: &str = "connectedDao";

/// Names inside a `connect` block: the kernel as `kernel` or `dao`, plus
/// apps discovered while connecting.
#[derive(Clone, Debug, Default)]
pub struct ConnectedDao {
    pub name: String,
    pub kernel: Option<Address>,
    pub apps: Vec<(String, Address)>,
}

impl ConnectedDao {
    fn from_arg(dao: &Value) -> Self {
        match dao {
            Value::Address(kernel) => ConnectedDao {
                name: kernel.to_string(),
                kernel: Some(*kernel),
                apps: Vec::new(),
            },
            Value::String(name) => ConnectedDao {
                name: name.clone(),
                ..ConnectedDao::default()
            },
            _ => ConnectedDao::default(),
        }
    }
}

impl DataProvider for ConnectedDao {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, identifier: &str) -> Option<Address> {
        match identifier {
            "kernel" | "dao" => self.kernel,
            _ => self
                .apps
                .iter()
                .find(|(name, _)| name == identifier)
                .map(|(_, address)| *address),
        }
    }

    fn identifiers(&self) -> Vec<String> {
        ["dao", "kernel"]
            .into_iter()
            .map(str::to_string)
            .chain(self.apps.iter().map(|(name, _)| name.clone()))
            .collect()
    }
}

fn scope(dao: ConnectedDao) -> BlockScope {
    let kernel = dao.kernel.map_or(Value::Placeholder, Value::Address);
    BlockScope {
        module: Some(NAME.to_string()),
        bindings: vec![
            Binding::new(
                PROVIDER,
                Namespace::DataProvider,
                Some(BindingValue::DataProvider(Arc::new(dao))),
            ),
            Binding::new("$dao", Namespace::User, Some(BindingValue::Value(kernel)))
                .with_parent(PROVIDER),
        ],
    }
}

/// `connect <dao> ( commands )`
pub(super) struct Connect;

#[async_trait]
impl Command for Connect {
    fn args(&self) -> &[ArgDef] {
        const ARGS: &[ArgDef] = &[
            ArgDef::new("dao", ArgType::Custom("dao")),
            ArgDef::new("body", ArgType::Block),
        ];
        ARGS
    }

    fn block_scope(
        &self,
        _module: &Module,
        args: &ResolvedArgs<'_>,
        _ctx: &CallContext<'_>,
    ) -> EvalResult<BlockScope> {
        Ok(scope(ConnectedDao::from_arg(args.require("dao")?)))
    }

    async fn run(
        &self,
        module: &Module,
        args: ResolvedArgs<'_>,
        ctx: &CallContext<'_>,
    ) -> EvalResult<Vec<Action>> {
        let mut dao = ConnectedDao::from_arg(args.require("dao")?);
        let body = args.block("body").ok_or_else(|| invalid("missing block"))?;
        if !ctx.is_eager() {
            let Some(kernel) = dao.kernel else {
                return Err(invalid(format!(
                    "cannot resolve DAO name `{}`; connect with the kernel address",
                    dao.name
                )));
            };
            match read_acl(kernel, ctx).await {
                Ok(acl) => dao.apps.push(("acl".to_string(), acl)),
                Err(e) => ctx
                    .logger()
                    .warn(&module.name, format!("could not read the ACL of {kernel}: {e}")),
            }
        }
        debug!(dao = %dao.name, apps = dao.apps.len(), "connect");
        ctx.logger()
            .info(&module.name, format!("connected to {}", dao.name));
        ctx.interpret_block(body, scope(dao)).await
    }
}

async fn read_acl(kernel: Address, ctx: &CallContext<'_>) -> EvalResult<Address> {
    let fragment = ctx.fragment("acl()(address)")?;
    let output = ctx.client()?.call(kernel, &fragment.encode_call(&[])?).await?;
    match fragment.decode_output(&output)? {
        Value::Address(acl) => Ok(acl),
        other => Err(invalid(format!("kernel returned {other} for acl()"))),
    }
}

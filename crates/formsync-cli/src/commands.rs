//! Command-line interface
//!
//! Every subcommand reads JSON input files and returns one JSON value for
//! stdout.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use formsync_core::{
    build_payload_from_form_data, fields_for_schema, mutation_variables, FieldAccess, Filter,
    FormData, FormEngine, PermissionContext, PermissionRecord,
};
use formsync_schema::{ObjectSchema, SchemaRegistry};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::config::CliConfig;

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn schema_args(command: Command, required: bool) -> Command {
    command
        .arg(path_arg("schema", "Schema document (JSON, or YAML by extension)").required(required))
        .arg(
            Arg::new("kind")
                .long("kind")
                .value_name("KIND")
                .required(required)
                .requires("schema")
                .help("Node kind to load from the schema document"),
        )
}

/// Build the `formsync` command
#[must_use]
pub fn command() -> Command {
    Command::new("formsync")
        .version(formsync_core::VERSION)
        .about("Reconcile form state with GraphQL mutations, permissions and filters")
        .arg_required_else_help(true)
        .arg(
            path_arg("config", "TOML configuration file")
                .global(true),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Fail on values and filters that would otherwise be left out"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(schema_args(
            Command::new("create")
                .about("Build create mutation variables from form data")
                .arg(path_arg("form", "Form data: {name: {source, value}}").required(true)),
            true,
        ))
        .subcommand(schema_args(
            Command::new("update")
                .about("Build update mutation variables from form data")
                .arg(path_arg("form", "Form data: {name: {source, value}}").required(true))
                .arg(
                    path_arg("current", "Object being edited, as returned by a query")
                        .required(true),
                ),
            false,
        ))
        .subcommand(schema_args(
            Command::new("filters")
                .about("Reconcile query-string filters into filter objects")
                .arg(path_arg("filters", "Filters: [{name, value}]").required(true)),
            true,
        ))
        .subcommand(
            Command::new("permission")
                .about("Resolve whether a field may be edited")
                .arg(path_arg("input", "Field access and context: {access, context}").required(true)),
        )
        .subcommand(
            Command::new("object-permission")
                .about("Aggregate per-action object permissions")
                .arg(path_arg("input", "Permission records: [{kind, view, create, update, delete}]").required(true)),
        )
}

/// Configuration from `--config`, with `--strict` and `--log-json` applied
///
/// # Errors
/// Returns error if the config file can't be loaded
pub fn load_config(matches: &ArgMatches) -> Result<CliConfig> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    Ok(config.with_overrides(matches.get_flag("strict"), matches.get_flag("log-json")))
}

/// Run the selected subcommand
///
/// # Errors
/// Returns error on unreadable input, and in strict mode on any value or
/// filter that would otherwise be left out
pub fn run(matches: &ArgMatches, engine: &FormEngine) -> Result<JsonValue> {
    match matches.subcommand() {
        Some(("create", args)) => create(args, engine),
        Some(("update", args)) => update(args, engine),
        Some(("filters", args)) => filters(args, engine),
        Some(("permission", args)) => permission(args, engine),
        Some(("object-permission", args)) => object_permission(args, engine),
        Some((other, _)) => Err(anyhow!("unknown subcommand {other}")),
        None => Err(anyhow!("no subcommand given")),
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .ok_or_else(|| anyhow!("missing --{name}"))
}

fn read_json(path: &Path) -> Result<JsonValue> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_input<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    serde_json::from_value(read_json(path)?)
        .with_context(|| format!("unexpected input shape in {}", path.display()))
}

/// Load a schema document and resolve `kind` with its generics merged in
///
/// # Errors
/// Returns error if the document can't be read or parsed, or doesn't
/// define `kind`
pub fn load_schema(path: &Path, kind: &str) -> Result<ObjectSchema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read schema {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let registry = if is_yaml {
        SchemaRegistry::from_yaml(&text)
    } else {
        SchemaRegistry::from_json(&text)
    }
    .with_context(|| format!("invalid schema {}", path.display()))?;

    let schema = registry.resolve(kind)?;
    tracing::debug!(
        kind,
        attributes = schema.attributes.len(),
        relationships = schema.relationships.len(),
        "schema resolved"
    );
    Ok(schema)
}

fn schema_from(args: &ArgMatches) -> Result<Option<ObjectSchema>> {
    match (args.get_one::<PathBuf>("schema"), args.get_one::<String>("kind")) {
        (Some(path), Some(kind)) => load_schema(path, kind).map(Some),
        (None, None) => Ok(None),
        _ => Err(anyhow!("--schema and --kind go together")),
    }
}

fn read_form_data(path: &Path, engine: &FormEngine) -> Result<FormData> {
    let raw = read_json(path)?;
    if engine.config().strict {
        return FormData::from_json_strict(&raw)
            .with_context(|| format!("invalid form data in {}", path.display()));
    }

    let (data, issues) = FormData::from_json_lenient(&raw);
    for issue in &issues {
        tracing::warn!(field = %issue.field, issue = %issue.kind, "form value ignored");
    }
    Ok(data)
}

fn create(args: &ArgMatches, engine: &FormEngine) -> Result<JsonValue> {
    let schema = schema_from(args)?.ok_or_else(|| anyhow!("create needs --schema and --kind"))?;
    let form_data = read_form_data(required(args, "form")?, engine)?;

    let fields = fields_for_schema(&schema, None);
    let payload = engine.create_payload(&fields, &form_data)?;
    Ok(mutation_variables(payload, None))
}

fn update(args: &ArgMatches, engine: &FormEngine) -> Result<JsonValue> {
    let form_data = read_form_data(required(args, "form")?, engine)?;
    let current = read_json(required(args, "current")?)?;
    let current_object = current
        .as_object()
        .ok_or_else(|| anyhow!("current object must be a JSON object"))?;
    let object_id = current_object.get("id").and_then(JsonValue::as_str);

    let payload = match schema_from(args)? {
        Some(schema) => {
            let fields = fields_for_schema(&schema, Some(current_object));
            engine.update_payload(&fields, &form_data)?
        }
        None => {
            tracing::info!("no schema given; comparing form data with the current object");
            build_payload_from_form_data(&form_data, Some(current_object))
        }
    };

    Ok(mutation_variables(payload, object_id))
}

fn filters(args: &ArgMatches, engine: &FormEngine) -> Result<JsonValue> {
    let schema = schema_from(args)?.ok_or_else(|| anyhow!("filters needs --schema and --kind"))?;
    let filters: Vec<Filter> = read_input(required(args, "filters")?)?;

    let map = engine.filters(&schema, &filters)?;
    Ok(serde_json::to_value(map)?)
}

#[derive(Debug, Deserialize)]
struct PermissionInput {
    #[serde(default)]
    access: FieldAccess,
    #[serde(default)]
    context: PermissionContext,
}

fn permission(args: &ArgMatches, engine: &FormEngine) -> Result<JsonValue> {
    let input: PermissionInput = read_input(required(args, "input")?)?;
    let resolution = engine.field_edit(&input.access, &input.context);
    Ok(serde_json::to_value(resolution)?)
}

fn object_permission(args: &ArgMatches, engine: &FormEngine) -> Result<JsonValue> {
    let records: Option<Vec<PermissionRecord>> = read_input(required(args, "input")?)?;
    let permission = engine.object_permission(records.as_deref());
    Ok(serde_json::to_value(permission)?)
}

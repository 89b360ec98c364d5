// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Lint, build and test orchestration for the studio booking workspace.
//!
//! ### Migration Verification
//!
//! `cargo xtask verify-migrations` applies the `SQLite` migrations to an
//! in-memory database, checks the resulting tables against the schema the
//! persistence layer expects, then reverts every migration and checks that
//! nothing is left behind. No external services are needed.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Check if README.md is up-to-date
    #[command(visible_alias = "cr")]
    CheckReadme,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    // Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Lint markdown files
    #[command(visible_alias = "md")]
    LintMarkdown,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Fix typos in the project
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Verify that migrations produce the expected schema and revert cleanly
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::CheckReadme => check_readme(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::LintMarkdown => lint_markdown(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::FixTypos => fix_typos(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test)
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Run cargo-rdme to check if README.md is up-to-date with the library documentation
fn check_readme() -> Result<()> {
    run_cargo(vec!["rdme", "--workspace-project", "studio-booking", "--check"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, typos, clippy, and docs (and a soft fail on markdown)
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    if let Err(err) = lint_markdown() {
        tracing::warn!("known issue: markdownlint is currently noisy and can be ignored: {err}");
    }
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Lint markdown files using [markdownlint-cli2](https://github.com/DavidAnson/markdownlint-cli2)
fn lint_markdown() -> Result<()> {
    cmd!("markdownlint-cli2", "**/*.md", "!target", "!**/target").run_with_trace()?;

    Ok(())
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Fix typos in the project
fn fix_typos() -> Result<()> {
    cmd!("typos", "-w").run_with_trace()?;
    Ok(())
}

/// Run tests for libs, backends, and docs
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}
/// Verify the `SQLite` migrations
///
/// Applies every migration to an in-memory database, compares the resulting
/// schema against [`EXPECTED_TABLES`], then reverts every migration and checks
/// that no tables remain.
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    #[allow(clippy::items_after_statements)]
    const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        embed_migrations!("../crates/persistence/migrations");

    tracing::info!("Starting migration verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply SQLite migrations: {}", e))?;
    tracing::info!("SQLite migrations applied successfully");

    let schema = introspect_sqlite_schema(&mut conn)?;
    check_schema(&schema)?;
    tracing::info!("Schema matches the persistence layer");

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to revert SQLite migrations: {}", e))?;

    let leftover = introspect_sqlite_schema(&mut conn)?;
    if !leftover.tables.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "❌ Migration verification FAILED: tables left after revert: {:?}",
            leftover.tables.keys().collect::<Vec<_>>()
        ));
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// A table the persistence layer reads and writes.
struct ExpectedTable {
    name: &'static str,
    primary_key: &'static str,
    columns: &'static [(&'static str, &'static str, bool)],
    foreign_keys: &'static [(&'static str, &'static str, &'static str)],
    unique_constraints: &'static [&'static [&'static str]],
    indexes: &'static [(&'static str, &'static [&'static str])],
}

/// Columns are `(name, normalized type, nullable)`; foreign keys are
/// `(column, referenced table, referenced column)`; indexes are
/// `(name, columns)`.
const EXPECTED_TABLES: &[ExpectedTable] = &[
    ExpectedTable {
        name: "audit_events",
        primary_key: "event_id",
        columns: &[
            ("event_id", "integer", true),
            ("class_id", "integer", true),
            ("actor_json", "text", false),
            ("cause_json", "text", false),
            ("action_json", "text", false),
            ("before_snapshot_json", "text", false),
            ("after_snapshot_json", "text", false),
            ("created_at", "text", false),
        ],
        foreign_keys: &[("class_id", "classes", "class_id")],
        unique_constraints: &[],
        indexes: &[("idx_audit_events_class", &["class_id"])],
    },
    ExpectedTable {
        name: "bookings",
        primary_key: "booking_id",
        columns: &[
            ("booking_id", "integer", true),
            ("user_id", "integer", false),
            ("class_id", "integer", false),
            ("subscription_id", "integer", true),
            ("status", "text", false),
            ("checked_in", "integer", false),
            ("created_at", "text", false),
        ],
        foreign_keys: &[
            ("class_id", "classes", "class_id"),
            ("subscription_id", "subscriptions", "subscription_id"),
        ],
        unique_constraints: &[],
        indexes: &[
            ("idx_bookings_class", &["class_id", "status"]),
            ("idx_bookings_one_confirmed", &["user_id", "class_id"]),
            ("idx_bookings_user", &["user_id"]),
        ],
    },
    ExpectedTable {
        name: "classes",
        primary_key: "class_id",
        columns: &[
            ("class_id", "integer", true),
            ("name", "text", false),
            ("capacity", "integer", false),
            ("enrolled", "integer", false),
            ("equipment_type", "text", false),
            ("category", "text", false),
            ("class_date", "text", false),
            ("start_time", "text", false),
            ("status", "text", false),
        ],
        foreign_keys: &[],
        unique_constraints: &[],
        indexes: &[("idx_classes_schedule", &["class_date", "start_time"])],
    },
    ExpectedTable {
        name: "subscriptions",
        primary_key: "subscription_id",
        columns: &[
            ("subscription_id", "integer", true),
            ("user_id", "integer", false),
            ("plan_id", "integer", false),
            ("remaining_classes", "integer", false),
            ("is_unlimited", "integer", false),
            ("equipment_access", "text", false),
            ("category", "text", false),
            ("status", "text", false),
            ("start_date", "text", false),
            ("end_date", "text", false),
        ],
        foreign_keys: &[],
        unique_constraints: &[],
        indexes: &[("idx_subscriptions_user", &["user_id"])],
    },
    ExpectedTable {
        name: "waitlist",
        primary_key: "waitlist_id",
        columns: &[
            ("waitlist_id", "integer", true),
            ("user_id", "integer", false),
            ("class_id", "integer", false),
            ("position", "integer", false),
            ("created_at", "text", false),
        ],
        foreign_keys: &[("class_id", "classes", "class_id")],
        unique_constraints: &[&["class_id", "user_id"], &["class_id", "position"]],
        indexes: &[("idx_waitlist_user", &["user_id"])],
    },
];

/// Compare the introspected schema against [`EXPECTED_TABLES`] and fail on mismatch
fn check_schema(schema: &Schema) -> Result<()> {
    let actual_tables: BTreeSet<&str> = schema.tables.keys().map(String::as_str).collect();
    let expected_tables: BTreeSet<&str> = EXPECTED_TABLES.iter().map(|t| t.name).collect();

    if actual_tables != expected_tables {
        let mut errors = Vec::new();

        for table in actual_tables.difference(&expected_tables) {
            errors.push(format!("  - Unexpected table '{table}'"));
        }

        for table in expected_tables.difference(&actual_tables) {
            errors.push(format!("  - Missing table '{table}'"));
        }

        return Err(color_eyre::eyre::eyre!(
            "❌ Migration verification FAILED: Table mismatch\n{}",
            errors.join("\n")
        ));
    }

    for expected in EXPECTED_TABLES {
        let table = &schema.tables[expected.name];

        let columns: BTreeSet<Column> = expected
            .columns
            .iter()
            .map(|(name, normalized_type, nullable)| Column {
                name: (*name).to_string(),
                normalized_type: (*normalized_type).to_string(),
                nullable: *nullable,
            })
            .collect();
        let actual_columns: BTreeSet<Column> = table.columns.values().cloned().collect();

        if columns != actual_columns {
            return Err(color_eyre::eyre::eyre!(
                "❌ Migration verification FAILED: Column mismatch in table '{}'\n  Expected: {:?}\n  Actual: {:?}",
                expected.name,
                columns,
                actual_columns
            ));
        }

        let primary_keys: BTreeSet<String> =
            std::iter::once(expected.primary_key.to_string()).collect();
        if table.primary_keys != primary_keys {
            return Err(color_eyre::eyre::eyre!(
                "❌ Migration verification FAILED: Primary key mismatch in table '{}'\n  Actual: {:?}",
                expected.name,
                table.primary_keys
            ));
        }

        let foreign_keys: BTreeSet<ForeignKey> = expected
            .foreign_keys
            .iter()
            .map(|(from, to_table, to)| ForeignKey {
                from_column: (*from).to_string(),
                to_table: (*to_table).to_string(),
                to_column: (*to).to_string(),
            })
            .collect();
        if table.foreign_keys != foreign_keys {
            return Err(color_eyre::eyre::eyre!(
                "❌ Migration verification FAILED: Foreign key mismatch in table '{}'\n  Expected: {:?}\n  Actual: {:?}",
                expected.name,
                foreign_keys,
                table.foreign_keys
            ));
        }

        let unique_constraints: BTreeSet<UniqueConstraint> = expected
            .unique_constraints
            .iter()
            .map(|columns| UniqueConstraint {
                columns: columns.iter().map(|c| (*c).to_string()).collect(),
            })
            .collect();
        if table.unique_constraints != unique_constraints {
            return Err(color_eyre::eyre::eyre!(
                "❌ Migration verification FAILED: Unique constraint mismatch in table '{}'\n  Expected: {:?}\n  Actual: {:?}",
                expected.name,
                unique_constraints,
                table.unique_constraints
            ));
        }

        let indexes: BTreeSet<Index> = expected
            .indexes
            .iter()
            .map(|(name, columns)| Index {
                name: (*name).to_string(),
                columns: columns.iter().map(|c| (*c).to_string()).collect(),
            })
            .collect();
        if table.indexes != indexes {
            return Err(color_eyre::eyre::eyre!(
                "❌ Migration verification FAILED: Index mismatch in table '{}'\n  Expected: {:?}\n  Actual: {:?}",
                expected.name,
                indexes,
                table.indexes
            ));
        }
    }

    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    name: String,
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
#[allow(clippy::too_many_lines)]
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    use diesel::RunQueryDsl;

    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Integer)]
        #[allow(dead_code)]
        cid: i32,
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        #[allow(dead_code)]
        unique: i32,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    // Get all tables
    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        // Get columns
        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            let normalized_type = normalize_sqlite_type(&col.r#type);
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    name: col.name.clone(),
                    normalized_type,
                    nullable: col.notnull == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        // Get foreign keys
        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        // Get indexes and unique constraints
        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            // If origin is 'u', it's a unique constraint (including sqlite_autoindex_*)
            if idx.origin == "u" {
                table_info.unique_constraints.insert(UniqueConstraint {
                    columns: column_names,
                });
            } else if !idx.name.starts_with("sqlite_autoindex_") {
                // Regular index (skip auto-generated indexes that aren't unique constraints)
                table_info.indexes.insert(Index {
                    name: idx.name,
                    columns: column_names,
                });
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}
/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("TEXT")
        || normalized.contains("CHAR")
        || normalized.contains("CLOB")
    {
        "text".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string() // Default for SQLite
    }
}
/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}

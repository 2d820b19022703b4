//! Command-line interface for yangtypes

#[cfg(feature = "cli")]
use clap::{ArgAction, Parser, Subcommand};
#[cfg(feature = "cli")]
use std::process::ExitCode;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use yangtypes::validators::builtins::{YANG_BITS, YANG_DECIMAL64, YANG_ENUMERATION, YANG_IDENTITYREF};
#[cfg(feature = "cli")]
use yangtypes::{BitDefs, EnumDefs, TypeDefinition, ValidationContext};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "yangtypes")]
#[command(author, version, about = "YANG typed value validation tool", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a value and print its canonical form
    Check {
        /// Built-in type name (int8 ... uint64, decimal64, string, binary,
        /// boolean, empty, bits, enumeration)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        type_name: String,

        /// Range restriction, e.g. "1..4 | 10..max"
        #[arg(long, allow_hyphen_values = true)]
        range: Option<String>,

        /// Length restriction for string and binary
        #[arg(long)]
        length: Option<String>,

        /// Pattern the value must match (repeatable)
        #[arg(long = "pattern", value_name = "REGEX")]
        patterns: Vec<String>,

        /// Pattern the value must not match (repeatable)
        #[arg(long = "invert-pattern", value_name = "REGEX")]
        inverted_patterns: Vec<String>,

        /// Fraction digits of a decimal64 type
        #[arg(long)]
        fraction_digits: Option<u8>,

        /// Bit or enum name, in declaration order (repeatable)
        #[arg(long = "member", value_name = "NAME")]
        members: Vec<String>,

        /// Print the canonical value as JSON
        #[arg(short, long)]
        json: bool,

        /// The lexical value
        #[arg(value_name = "VALUE", allow_hyphen_values = true)]
        value: String,
    },
}

#[cfg(feature = "cli")]
fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            type_name,
            range,
            length,
            patterns,
            inverted_patterns,
            fraction_digits,
            members,
            json,
            value,
        } => {
            let restrictions = Restrictions {
                range,
                length,
                patterns,
                inverted_patterns,
            };
            let ty = match build_type(&type_name, fraction_digits, &members, restrictions) {
                Ok(ty) => ty,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(2);
                }
            };
            cmd_check(&ty, &value, json)
        }
    }
}

#[cfg(feature = "cli")]
struct Restrictions {
    range: Option<String>,
    length: Option<String>,
    patterns: Vec<String>,
    inverted_patterns: Vec<String>,
}

#[cfg(feature = "cli")]
fn build_type(
    type_name: &str,
    fraction_digits: Option<u8>,
    members: &[String],
    restrictions: Restrictions,
) -> yangtypes::Result<TypeDefinition> {
    let mut ty = match type_name {
        YANG_DECIMAL64 => {
            let digits = fraction_digits.ok_or_else(|| {
                yangtypes::Error::Type("decimal64 requires --fraction-digits".to_string())
            })?;
            TypeDefinition::decimal64(digits)?
        }
        YANG_BITS => TypeDefinition::bits(BitDefs::from_names(members.iter().cloned())?),
        YANG_ENUMERATION => {
            TypeDefinition::enumeration(EnumDefs::from_names(members.iter().cloned())?)
        }
        YANG_IDENTITYREF => {
            return Err(yangtypes::Error::Type(
                "identityref values need a schema with identities".to_string(),
            ))
        }
        other => TypeDefinition::from_builtin_name(other)
            .ok_or_else(|| yangtypes::Error::Type(format!("Unknown built-in type: {}", other)))?,
    };

    if let Some(range) = &restrictions.range {
        ty = ty.with_range(range)?;
    }
    if let Some(length) = &restrictions.length {
        ty = ty.with_length(length)?;
    }
    for pattern in &restrictions.patterns {
        ty = ty.with_pattern(pattern)?;
    }
    for pattern in &restrictions.inverted_patterns {
        ty = ty.with_inverted_pattern(pattern)?;
    }

    tracing::debug!(type_name = ty.type_name(), "built type");
    Ok(ty)
}

#[cfg(feature = "cli")]
fn cmd_check(ty: &TypeDefinition, value: &str, json: bool) -> ExitCode {
    let ctx = ValidationContext::new();

    match ty.validate(value, &ctx) {
        Ok(canonical) => {
            if json {
                match serde_json::to_string_pretty(&canonical) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::from(2);
                    }
                }
            } else {
                println!("{}", canonical);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}

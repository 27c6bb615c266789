use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, StorageBackend};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hr_portal::model::{AccountForm, EmployeeForm, Registration, RequestForm, RequestItem, Role};
use hr_portal::{
    DomainError, InMemoryStorage, JsonFileStorage, KeyValueStorage, NoticeLevel,
    RecordingNotifier, Router, Service, ServiceConfig, Store, StoreKeys,
};

mod render;

use render::TextRenderer;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// HR Portal - accounts, employees and supply requests from the command line
#[derive(Parser)]
#[command(name = "hr-portal")]
#[command(about = "HR Portal - accounts, employees and supply requests from the command line")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Storage file (overrides config)
    #[arg(long, global = true)]
    storage: Option<String>,

    /// Use process-local storage; nothing survives the command
    #[arg(long, global = true)]
    memory: bool,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Self-service sign-up; the new account starts unverified
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Simulate following the verification link (defaults to the latest registration)
    Verify {
        #[arg(long)]
        email: Option<String>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the current identity
    Whoami,
    /// Navigate to a location such as `#/requests` and render the resulting view
    Open {
        #[arg(default_value = "#/")]
        location: String,
    },
    /// Manage accounts (admin)
    #[command(subcommand)]
    Account(AccountCommand),
    /// Manage employees (admin)
    #[command(subcommand)]
    Employee(EmployeeCommand),
    /// Departments (admin, read-only)
    #[command(subcommand)]
    Department(DepartmentCommand),
    /// Submit and list your own requests
    #[command(subcommand)]
    Request(RequestCommand),
    /// Check configuration
    Check,
}

#[derive(Args)]
struct AccountFields {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// Admin or User
    #[arg(long, default_value = "User", value_parser = parse_role)]
    role: Role,
    #[arg(long)]
    verified: bool,
}

impl From<AccountFields> for AccountForm {
    fn from(f: AccountFields) -> Self {
        AccountForm {
            first_name: f.first_name,
            last_name: f.last_name,
            email: f.email,
            password: f.password,
            role: f.role,
            verified: f.verified,
        }
    }
}

#[derive(Subcommand)]
enum AccountCommand {
    List,
    Create(AccountFields),
    /// Replace every field of the account stored under `original_email`
    Update {
        original_email: String,
        #[command(flatten)]
        fields: AccountFields,
    },
    Delete { email: String },
    ResetPassword {
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Args)]
struct EmployeeFields {
    #[arg(long)]
    employee_id: String,
    #[arg(long)]
    user_email: String,
    #[arg(long)]
    position: String,
    #[arg(long)]
    department_id: i64,
    /// YYYY-MM-DD
    #[arg(long)]
    hire_date: NaiveDate,
}

impl From<EmployeeFields> for EmployeeForm {
    fn from(f: EmployeeFields) -> Self {
        EmployeeForm {
            employee_id: f.employee_id,
            user_email: f.user_email,
            position: f.position,
            department_id: f.department_id,
            hire_date: f.hire_date,
        }
    }
}

#[derive(Subcommand)]
enum EmployeeCommand {
    List,
    Add(EmployeeFields),
    Update {
        original_id: String,
        #[command(flatten)]
        fields: EmployeeFields,
    },
    Delete { employee_id: String },
}

#[derive(Subcommand)]
enum DepartmentCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum RequestCommand {
    List,
    New {
        #[arg(long = "type")]
        kind: String,
        /// Line item as `name:qty`; repeat for more items
        #[arg(long = "item", value_parser = parse_item)]
        items: Vec<RequestItem>,
    },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::parse(raw).ok_or_else(|| format!("unknown role '{raw}', expected Admin or User"))
}

fn parse_item(raw: &str) -> Result<RequestItem, String> {
    let (name, qty) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("item '{raw}' must look like name:qty"))?;
    let qty = qty
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("item '{raw}': bad quantity: {e}"))?;
    Ok(RequestItem::new(name, qty))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        storage: cli.storage.clone(),
        memory: cli.memory,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (storage / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));
    tracing::debug!(home_dir = %config.home_dir, "HR Portal starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let command = cli.command.unwrap_or(Commands::Open {
        location: "#/".to_string(),
    });
    if let Commands::Check = command {
        return check_config(&config);
    }

    let notifier = Arc::new(RecordingNotifier::new());
    let mut service = open_service(&config, notifier.clone());
    let result = execute(&mut service, &notifier, command, cli.yes);

    for notice in notifier.drain() {
        eprintln!("[{}] {}", level_label(notice.level), notice.message);
    }
    result
}

fn open_service(config: &AppConfig, notifier: Arc<RecordingNotifier>) -> Service {
    let storage: Box<dyn KeyValueStorage> = match config.storage.backend {
        StorageBackend::File => {
            let path = config.storage_path();
            tracing::info!("Opening storage file: {}", path.display());
            Box::new(JsonFileStorage::open(path).with_quota(config.storage.quota_bytes))
        }
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage");
            let storage = InMemoryStorage::new();
            storage.set_quota(config.storage.quota_bytes);
            Box::new(storage)
        }
    };

    let keys = StoreKeys {
        snapshot: config.portal.snapshot_key.clone(),
        session: config.portal.session_key.clone(),
        unverified: config.portal.unverified_key.clone(),
    };
    let store = Store::open(storage, keys, notifier);
    let service_config = ServiceConfig {
        min_password_length: config.portal.min_password_length,
    };
    Service::start(store, service_config)
}

fn execute(
    service: &mut Service,
    notifier: &Arc<RecordingNotifier>,
    command: Commands,
    assume_yes: bool,
) -> Result<()> {
    let confirm = |prompt: &str| assume_yes || prompt_on_stdin(prompt);

    match command {
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            let account = service
                .register(Registration {
                    first_name,
                    last_name,
                    email,
                    password,
                })
                .map_err(domain)?;
            println!("Registered {}. Verify your email to log in.", account.email);
            open(service, notifier, "#/verify-email");
        }
        Commands::Verify { email } => {
            let email = match email {
                Some(email) => {
                    service.verify_email(&email).map_err(domain)?;
                    email
                }
                None => service.verify_pending().map_err(domain)?,
            };
            println!("Verified {email}. You can now log in.");
        }
        Commands::Login { email, password } => {
            let account = service.login(&email, &password).map_err(domain)?;
            println!("Logged in as {}", account.display_name());
        }
        Commands::Logout => {
            service.logout();
            println!("Logged out");
        }
        Commands::Whoami => match service.current_account() {
            Some(account) => println!(
                "{} <{}> ({})",
                account.display_name(),
                account.email,
                account.role
            ),
            None => println!("Not logged in"),
        },
        Commands::Open { location } => open(service, notifier, &location),
        Commands::Account(cmd) => match cmd {
            AccountCommand::List => {
                service.list_accounts().map_err(domain)?;
                open(service, notifier, "#/accounts");
            }
            AccountCommand::Create(fields) => {
                let account = service.create_account(fields.into()).map_err(domain)?;
                println!("Account created: {}", account.email);
            }
            AccountCommand::Update {
                original_email,
                fields,
            } => match service
                .update_account(&original_email, fields.into())
                .map_err(domain)?
            {
                Some(account) => println!("Account updated: {}", account.email),
                None => println!("No account under {original_email}, nothing changed"),
            },
            AccountCommand::Delete { email } => {
                service.delete_account(&email, &confirm).map_err(domain)?;
                println!("Account deleted");
            }
            AccountCommand::ResetPassword { email, password } => {
                service.reset_password(&email, &password).map_err(domain)?;
                println!("Password reset successful");
            }
        },
        Commands::Employee(cmd) => match cmd {
            EmployeeCommand::List => {
                service.list_employees().map_err(domain)?;
                open(service, notifier, "#/employees");
            }
            EmployeeCommand::Add(fields) => {
                let employee = service.create_employee(fields.into()).map_err(domain)?;
                println!("Employee added: {}", employee.employee_id);
            }
            EmployeeCommand::Update {
                original_id,
                fields,
            } => match service
                .update_employee(&original_id, fields.into())
                .map_err(domain)?
            {
                Some(employee) => println!("Employee updated: {}", employee.employee_id),
                None => println!("No employee under {original_id}, nothing changed"),
            },
            EmployeeCommand::Delete { employee_id } => {
                service
                    .delete_employee(&employee_id, &confirm)
                    .map_err(domain)?;
                println!("Employee deleted");
            }
        },
        Commands::Department(cmd) => match cmd {
            DepartmentCommand::List => {
                service.list_departments().map_err(domain)?;
                open(service, notifier, "#/departments");
            }
            DepartmentCommand::Add { name, description } => {
                service
                    .create_department(&name, &description)
                    .map_err(domain)?;
            }
            DepartmentCommand::Edit {
                id,
                name,
                description,
            } => {
                service
                    .update_department(id, &name, &description)
                    .map_err(domain)?;
            }
            DepartmentCommand::Delete { id } => {
                service.delete_department(id).map_err(domain)?;
            }
        },
        Commands::Request(cmd) => match cmd {
            RequestCommand::List => {
                service.my_requests().map_err(domain)?;
                open(service, notifier, "#/requests");
            }
            RequestCommand::New { kind, items } => {
                let request = service
                    .create_request(RequestForm { kind, items })
                    .map_err(domain)?;
                println!("Request {} submitted", request.id);
            }
        },
        // runs in main before the store is opened
        Commands::Check => {}
    }
    Ok(())
}

fn open(service: &Service, notifier: &Arc<RecordingNotifier>, location: &str) {
    let router = Router::new(notifier.clone());
    let mut renderer = TextRenderer::new();
    router.navigate(service, location, &mut renderer);
    print!("{}", renderer.into_output());
}

fn domain(e: DomainError) -> anyhow::Error {
    anyhow!("{e} [{}]", e.code())
}

fn level_label(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "success",
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Danger => "error",
    }
}

fn prompt_on_stdin(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = std::io::stderr().flush();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if config.portal.min_password_length == 0 {
        bail!("portal.min_password_length must be at least 1");
    }
    if config.storage.backend == StorageBackend::File {
        let path = config.storage_path();
        if let Some(e) = JsonFileStorage::open(&path).load_error() {
            bail!("{e}");
        }
        println!("Storage file: {}", path.display());
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

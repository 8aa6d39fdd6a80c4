use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use sajre_client::dashboard::admin::{self, AdminDashboard, EntityKind};
use sajre_client::dashboard::mentor::MentorDashboard;
use sajre_client::dashboard::poller::StudentPoller;
use sajre_client::dashboard::student::StudentDashboard;
use sajre_client::dashboard::table::{Column, DataTable};
use sajre_client::dashboard::vendor::VendorDashboard;
use sajre_client::dashboard::{recent, DashboardError};
use sajre_client::flows::contact::Contact;
use sajre_client::flows::course::{create_course, CourseForm};
use sajre_client::flows::issue::{issue, IssueRequest};
use sajre_client::flows::otp::OtpVerification;
use sajre_client::flows::payment::{pay, record_local_enrollment, PaymentMethod, PAYMENT_ERROR};
use sajre_client::flows::registration::{Registration, SignupDetails, SignupRole, REGISTRATION_FAILED};
use sajre_client::flows::{catalog, login, FlowError};
use sajre_client::models::{Activity, Role};
use sajre_client::referral::{make_referral_code_for, role_from_code};
use sajre_client::store::{
    MentorProfile, NewUser, Profile, StoreOptions, StudentProfile, VendorProfile, DEFAULT_ADMIN_ID,
};
use sajre_client::telemetry::{get_subscriber, init_subscriber};
use sajre_client::{ApiClient, AppConfig, FileStorage, LocalStore, Session, Storage};
use secrecy::Secret;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "sajre", author, version, about = "Sajre Edutech client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a student, vendor or mentor account
    Register(RegisterArgs),
    /// Confirm the pending registration with the emailed OTP
    VerifyOtp { otp: String },
    /// Sign in and print the landing page for the role
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List courses
    Courses {
        /// Ask the backend instead of the built-in catalogue
        #[arg(long)]
        remote: bool,
    },
    /// Pay for a course as the signed-in student
    Pay(PayArgs),
    /// Send a message to the support team
    Contact(ContactArgs),
    /// Referral code helpers
    #[command(subcommand)]
    Code(CodeCommand),
    /// Issue the key the next role down registers with
    IssueCode(IssueArgs),
    /// Course management
    #[command(subcommand)]
    Course(CourseCommand),
    /// Role dashboards
    Dashboard(DashboardArgs),
    /// Admin edits
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Offline demo store
    #[command(subcommand)]
    Store(StoreCommand),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long, value_enum)]
    role: RoleArg,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long, default_value = "")]
    phone: String,
    /// Code from a mentor (students)
    #[arg(long, default_value = "")]
    referral_code: String,
    /// Key from an admin (vendors)
    #[arg(long, default_value = "")]
    vendor_key: String,
    /// Key from a vendor (mentors)
    #[arg(long, default_value = "")]
    mentor_key: String,
    #[arg(long, default_value = "")]
    specialization: String,
    #[arg(long, default_value = "")]
    bio: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RoleArg {
    Student,
    Vendor,
    Mentor,
}

impl From<RoleArg> for SignupRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Student => SignupRole::Student,
            RoleArg::Vendor => SignupRole::Vendor,
            RoleArg::Mentor => SignupRole::Mentor,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MethodArg {
    Card,
    Upi,
    Wallet,
    Netbanking,
}

#[derive(Args, Debug)]
struct PayArgs {
    #[arg(long)]
    course_id: String,
    #[arg(long, value_enum, default_value = "card")]
    method: MethodArg,
    #[arg(long, default_value = "")]
    card_number: String,
    #[arg(long, default_value = "")]
    expiry: String,
    #[arg(long, default_value = "")]
    cvv: String,
    #[arg(long, default_value = "")]
    holder: String,
    #[arg(long, default_value = "")]
    upi_id: String,
    #[arg(long, default_value = "")]
    wallet: String,
    #[arg(long, default_value = "")]
    bank: String,
    #[arg(long, default_value = "")]
    referral_code: String,
}

impl PayArgs {
    fn method(&self) -> PaymentMethod {
        match self.method {
            MethodArg::Card => PaymentMethod::Card {
                number: self.card_number.clone(),
                expiry: self.expiry.clone(),
                cvv: self.cvv.clone(),
                holder: self.holder.clone(),
            },
            MethodArg::Upi => PaymentMethod::Upi { id: self.upi_id.clone() },
            MethodArg::Wallet => PaymentMethod::Wallet {
                wallet: self.wallet.clone(),
            },
            MethodArg::Netbanking => PaymentMethod::NetBanking { bank: self.bank.clone() },
        }
    }
}

#[derive(Args, Debug)]
struct ContactArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    subject: String,
    #[arg(long)]
    message: String,
    /// Agree to the Terms of Service
    #[arg(long)]
    agree: bool,
}

#[derive(Subcommand, Debug)]
enum CodeCommand {
    /// Generate a code for a role name
    Make { role: String },
    /// Show the role a code was issued for
    Parse { code: String },
}

#[derive(Args, Debug)]
struct IssueArgs {
    /// Admin: new vendor's company
    #[arg(long)]
    company_name: Option<String>,
    /// Admin: new vendor's description
    #[arg(long)]
    description: Option<String>,
    /// Vendor: new mentor's name
    #[arg(long)]
    mentor_name: Option<String>,
    /// Vendor: new mentor's specialization
    #[arg(long)]
    specialization: Option<String>,
    /// Site origin used in the share link
    #[arg(long, default_value = "http://localhost:5173")]
    origin: String,
}

#[derive(Subcommand, Debug)]
enum CourseCommand {
    /// Create a course (admin)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        duration: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "beginner")]
        level: String,
        #[arg(long)]
        max_students: String,
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        end_date: String,
    },
}

#[derive(Args, Debug)]
struct DashboardArgs {
    #[arg(value_enum)]
    which: DashboardKind,
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(short, long, default_value_t = 1)]
    page: usize,
    /// Mentor only: keep refreshing students until Ctrl-C
    #[arg(long)]
    watch: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DashboardKind {
    Admin,
    Vendor,
    Mentor,
    Student,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Update a record from a JSON object that includes its `_id`
    Update { kind: String, json: String },
    /// Delete a record
    Delete { kind: String, id: String },
}

#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Add a user; with --code the creator is resolved from its referral code
    Add {
        #[arg(long)]
        role: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long, default_value = "")]
        company_name: String,
        #[arg(long, default_value = "")]
        specialization: String,
    },
    /// Sign in to the store; the student dashboard shows this user
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the store's signed-in user
    Logout,
    /// Print the referral tree below a user
    Tree {
        #[arg(default_value = DEFAULT_ADMIN_ID)]
        root: String,
    },
    /// Users per role
    Counts,
    /// Back to the default admin only
    Reset,
}

struct App {
    config: AppConfig,
    api: ApiClient,
    storage: Arc<dyn Storage>,
    session: Session,
}

impl App {
    fn admin_email(&self) -> Option<&str> {
        Some(self.config.auth.admin_email.as_str()).filter(|e| !e.is_empty())
    }

    fn store(&self) -> Result<LocalStore, Box<dyn std::error::Error>> {
        let options = StoreOptions {
            password_cost: self.config.auth.password_hash_cost,
        };
        Ok(LocalStore::load(self.storage.clone(), options)?)
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let config = match AppConfig::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(2);
        }
    };
    let subscriber = get_subscriber(config.log.level.clone(), std::io::stderr);
    if let Err(e) = init_subscriber(subscriber) {
        eprintln!("⚠️ Logging disabled: {}", e);
    }

    if let Err(e) = run(cli, config).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api = ApiClient::with_timeout(&config.api.base_url, config.api.timeout())?;
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage.path));
    let session = Session::restore(storage.clone())?;
    let mut app = App {
        config,
        api,
        storage,
        session,
    };

    match cli.command {
        Command::Register(args) => register(&app, args).await?,
        Command::VerifyOtp { otp } => {
            let mut flow = OtpVerification::start(&app.session)?;
            let Some(email) = flow.email().map(str::to_string) else {
                println!("❌ No pending email found.");
                return Ok(());
            };
            match flow.verify(&app.api, &app.session, &otp).await {
                Ok(route) => println!("✅ {} verified. Next: {}", email, route),
                Err(e) => return Err(e.user_message("Invalid OTP").into()),
            }
        }
        Command::Login { email, password } => {
            let admin_email = app.admin_email().map(str::to_string);
            match login::login(&app.api, &mut app.session, admin_email.as_deref(), &email, &password).await {
                Ok(route) => println!("✅ Signed in. Next: {}", route),
                Err(e) => return Err(e.user_message(login::LOGIN_FAILED).into()),
            }
        }
        Command::Logout => {
            let route = login::logout(&mut app.session)?;
            println!("👋 Signed out. Next: {}", route);
        }
        Command::Whoami => match app.session.user() {
            Some(user) => println!("👤 {} <{}> ({})", user.name, user.email, user.role.label()),
            None => println!("Not signed in."),
        },
        Command::Courses { remote } => {
            if remote {
                for course in catalog::public_courses(&app.api).await? {
                    println!("📘 {} [{}] {}", course.title, course.level, course.category);
                }
            } else {
                for course in catalog::CATALOG.iter() {
                    println!("📘 {}: {}", course.title, course.summary);
                    println!("   🎟️ {} ({})", course.coupon, course.discount_label());
                }
            }
        }
        Command::Pay(args) => {
            let method = args.method();
            match pay(&app.api, &mut app.session, &method, &args.course_id, &args.referral_code).await {
                Ok(_) => {
                    println!("✅ Payment successful. You are enrolled.");
                    if record_local_enrollment(&mut app.store()?)? {
                        println!("   Offline profile marked as enrolled.");
                    }
                }
                Err(FlowError::Access(e)) => return Err(format!("{}. Next: {}", e, e.redirect()).into()),
                Err(e) => return Err(e.user_message(PAYMENT_ERROR).into()),
            }
        }
        Command::Contact(args) => {
            let mut contact = Contact::default();
            contact.form.name = args.name;
            contact.form.email = args.email;
            contact.form.phone = args.phone;
            contact.form.subject = args.subject;
            contact.form.message = args.message;
            contact.form.agree_to_terms = args.agree;
            let result = contact.submit(&app.api).await;
            if let Some(status) = contact.status() {
                println!("{}", status.message);
            }
            if result.is_err() {
                std::process::exit(1);
            }
        }
        Command::Code(CodeCommand::Make { role }) => println!("{}", make_referral_code_for(&role)),
        Command::Code(CodeCommand::Parse { code }) => match role_from_code(&code) {
            Some(role) => println!("{}", role),
            None => println!("❌ Unrecognised code"),
        },
        Command::IssueCode(args) => issue_code(&app, args).await?,
        Command::Course(CourseCommand::Create {
            title,
            description,
            duration,
            price,
            category,
            level,
            max_students,
            start_date,
            end_date,
        }) => {
            let (_, token) = app.session.require_role(Role::Admin)?;
            let form = CourseForm {
                title,
                description,
                duration,
                price,
                category,
                level,
                max_students,
                start_date,
                end_date,
            };
            let course = create_course(&app.api, token, &form).await?;
            println!("✅ Course created successfully! {}", course.id.unwrap_or_default());
        }
        Command::Dashboard(args) => dashboard(&mut app, args).await?,
        Command::Admin(command) => {
            let (_, token) = app.session.require_role(Role::Admin)?;
            match command {
                AdminCommand::Update { kind, json } => {
                    let kind = parse_kind(&kind)?;
                    let item: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&json)?;
                    admin::save(&app.api, token, kind, item).await?;
                    println!("✅ {} saved successfully!", kind);
                }
                AdminCommand::Delete { kind, id } => {
                    let kind = parse_kind(&kind)?;
                    admin::delete(&app.api, token, kind, &id).await?;
                    println!("✅ {} deleted successfully!", kind);
                }
            }
        }
        Command::Store(command) => store(&app, command)?,
    }
    Ok(())
}

fn parse_kind(kind: &str) -> Result<EntityKind, String> {
    EntityKind::parse(kind).ok_or_else(|| format!("Invalid type: {}", kind))
}

async fn register(app: &App, args: RegisterArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut registration = Registration::new();
    let form = registration.select_role(args.role.into());
    form.name = args.name;
    form.email = args.email;
    form.password = Secret::new(args.password);
    form.phone = args.phone;
    form.details = match args.role {
        RoleArg::Student => SignupDetails::Student {
            referral_code: args.referral_code,
        },
        RoleArg::Vendor => SignupDetails::Vendor {
            vendor_key: args.vendor_key,
        },
        RoleArg::Mentor => SignupDetails::Mentor {
            mentor_key: args.mentor_key,
            specialization: args.specialization,
            bio: args.bio,
        },
    };
    match registration.submit(&app.api, &app.session).await {
        Ok(route) => {
            println!("✅ Registered. Check your inbox for the OTP. Next: {}", route);
            Ok(())
        }
        Err(e) => Err(e.user_message(REGISTRATION_FAILED).into()),
    }
}

async fn issue_code(app: &App, args: IssueArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (user, token) = app
        .session
        .user()
        .zip(app.session.token())
        .ok_or("Please log in first")?;
    let request = match user.role {
        Role::Admin => IssueRequest::Vendor {
            company_name: args.company_name.unwrap_or_default(),
            description: args.description.unwrap_or_default(),
        },
        Role::Vendor => IssueRequest::Mentor {
            mentor_name: args.mentor_name.unwrap_or_default(),
            specialization: args.specialization.unwrap_or_default(),
        },
        Role::Mentor => IssueRequest::StudentCode,
        Role::Student => return Err("Students cannot issue referral codes".into()),
    };
    let issued = issue(&app.api, token, user.role, &request, &args.origin)
        .await
        .map_err(|e| e.user_message(sajre_client::flows::issue::GENERATE_FAILED))?;
    println!("🔑 {}", issued.code);
    println!("🔗 {}", issued.share_link);
    Ok(())
}

fn print_feed(activities: &[Activity]) {
    if activities.is_empty() {
        println!("   No recent activity");
    }
    for a in recent(activities) {
        println!("   • {}: {} ({})", a.title, a.description, a.time);
    }
}

fn print_table(table: &DataTable, search: &str, page: usize) {
    let page = table.page(search, page);
    for row in &page.rows {
        let cells: Vec<String> = table
            .columns()
            .iter()
            .map(|c| sajre_client::dashboard::table::cell_text(row, c.key).unwrap_or_else(|| "-".into()))
            .collect();
        println!("   {}", cells.join(" | "));
    }
    if page.total_pages > 1 {
        println!("   {}", page.summary());
    }
}

fn student_columns() -> Vec<Column> {
    vec![
        Column::new("userId.name", "Student"),
        Column::new("userId.email", "Email"),
        Column::new("isEnrolled", "Enrolled"),
    ]
}

async fn dashboard(app: &mut App, args: DashboardArgs) -> Result<(), Box<dyn std::error::Error>> {
    let result: Result<(), DashboardError> = async {
        match args.which {
            DashboardKind::Admin => {
                let board = AdminDashboard::load(&app.api, &app.session).await?;
                println!("📊 Admin dashboard");
                for (name, value) in board.role_distribution() {
                    println!("   {}: {}", name, value);
                }
                print_feed(&board.activity_feed());
                let matches = board.search(&args.search);
                println!("🏢 Vendors ({})", matches.vendors.len());
                for v in matches.vendors {
                    println!("   {} | {} | {}", v.company_name, v.name().unwrap_or("-"), v.email().unwrap_or("-"));
                }
                println!("🧑‍🏫 Mentors ({})", matches.mentors.len());
                for m in matches.mentors {
                    println!("   {} | {}", m.name().unwrap_or("-"), m.specialization);
                }
                println!("🎓 Students ({})", matches.students.len());
                for s in matches.students {
                    println!("   {} | {} | {}", s.name().unwrap_or("-"), s.mentor_name().unwrap_or("-"), s.status_label());
                }
                println!("📘 Courses ({})", matches.courses.len());
                println!("🧾 Enrollments ({})", matches.enrollments.len());
            }
            DashboardKind::Vendor => {
                let board = VendorDashboard::load(&app.api, &mut app.session).await?;
                println!("📊 Vendor dashboard");
                for (name, value) in board.team_split() {
                    println!("   {}: {}", name, value);
                }
                println!("   Revenue: ₹{:.2}", board.total_revenue());
                for metric in board.performance() {
                    let mark = if metric.on_target() { "✅" } else { "⚠️" };
                    println!("   {} {}: {} / {}", mark, metric.name, metric.value, metric.target);
                }
                for m in board.search_mentors(&args.search) {
                    println!("   🧑‍🏫 {} <{}>", m.name().unwrap_or("-"), m.email().unwrap_or("-"));
                }
                for s in board.search_students(&args.search) {
                    println!("   🎓 {} <{}>", s.name().unwrap_or("-"), s.email().unwrap_or("-"));
                }
            }
            DashboardKind::Mentor => {
                let board = MentorDashboard::load(&app.api, &app.session).await?;
                println!("📊 Mentor dashboard{}", if board.degraded { " (offline)" } else { "" });
                for (name, value) in board.referral_split() {
                    println!("   {}: {}", name, value);
                }
                print_feed(&board.activities);
                let table = DataTable::from_records(student_columns(), &board.students)
                    .map_err(|e| DashboardError::Rejected(e.to_string()))?;
                print_table(&table, &args.search, args.page);

                if args.watch {
                    let token = app.session.token().unwrap_or_default().to_string();
                    let poller = StudentPoller::spawn(
                        app.api.clone(),
                        token,
                        app.config.dashboard.mentor_poll_interval(),
                        board.students.clone(),
                    );
                    let mut updates = poller.subscribe();
                    println!("👀 Watching students, Ctrl-C to stop");
                    loop {
                        tokio::select! {
                            changed = updates.changed() => {
                                if changed.is_err() { break; }
                                let students = updates.borrow_and_update().clone();
                                println!("🔄 {} students", students.len());
                                if let Ok(table) = DataTable::from_records(student_columns(), &students) {
                                    print_table(&table, &args.search, args.page);
                                }
                            }
                            _ = tokio::signal::ctrl_c() => break,
                        }
                    }
                    poller.stop();
                }
            }
            DashboardKind::Student => {
                let store = LocalStore::load(
                    app.storage.clone(),
                    StoreOptions {
                        password_cost: app.config.auth.password_hash_cost,
                    },
                )?;
                let Some(board) = StudentDashboard::load(&app.api, &app.session, &store).await else {
                    println!("Not signed in.");
                    return Ok(());
                };
                println!("👤 {} <{}>", board.profile.username, board.profile.email);
                println!("   Progress: {:.0}%", board.progress());
                print_feed(&board.activities);
            }
        }
        Ok(())
    }
    .await;

    match result {
        Err(e) => {
            let hint = e.redirect().map(|r| format!(". Next: {}", r)).unwrap_or_default();
            Err(format!("{}{}", e, hint).into())
        }
        Ok(()) => Ok(()),
    }
}

fn store(app: &App, command: StoreCommand) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = app.store()?;
    match command {
        StoreCommand::Add {
            role,
            username,
            email,
            password,
            code,
            company_name,
            specialization,
        } => {
            let role = Role::parse(&role).ok_or_else(|| format!("Unknown role: {}", role))?;
            let profile = match role {
                Role::Admin => Profile::Admin,
                Role::Vendor => Profile::Vendor(VendorProfile {
                    company_name,
                    ..VendorProfile::default()
                }),
                Role::Mentor => Profile::Mentor(MentorProfile {
                    specialization,
                    ..MentorProfile::default()
                }),
                Role::Student => Profile::Student(StudentProfile::default()),
            };
            let new_user = NewUser::new(&username, &email, &password, profile);
            let entity = match code {
                Some(code) => store.add_referred_user(&code, new_user)?,
                None => store.add_user(new_user)?,
            };
            println!("✅ Added {} ({}) with code {}", entity.username, entity.role(), entity.referral_code);
        }
        StoreCommand::Login { email, password } => {
            match store.login(&email, &password) {
                Some(entity) => println!("✅ {} ({})", entity.username, entity.role()),
                None => return Err("Invalid credentials".into()),
            }
            store.save_current_user()?;
        }
        StoreCommand::Logout => {
            store.set_current_user(None);
            store.save_current_user()?;
            println!("👋 Signed out of the store");
        }
        StoreCommand::Tree { root } => {
            let Some(top) = store.get_by_id(&root) else {
                return Err(format!("No user with id {}", root).into());
            };
            println!("{} ({})", top.username, top.role());
            for (depth, entity) in store.descendants_of(&root) {
                println!("{}└ {} ({}) {}", "  ".repeat(depth), entity.username, entity.role(), entity.email);
            }
        }
        StoreCommand::Counts => {
            let counts = store.counts();
            println!(
                "admins: {}, vendors: {}, mentors: {}, users: {}",
                counts.admins, counts.vendors, counts.mentors, counts.users
            );
        }
        StoreCommand::Reset => {
            store.reset()?;
            println!("✅ Store reset to the default admin");
        }
    }
    Ok(())
}

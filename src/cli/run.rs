use crate::{
    app::App,
    cancel::CancelToken,
    cli::{
        command::{Cli, Commands, ContactFields, SortKey},
        input,
    },
    config::Config,
    domain::{Contact, ContactDraft},
    errors::AppError,
    session::Restore,
};
use clap::Parser;
use dotenv::dotenv;

pub fn run_app() -> Result<(), AppError> {
    // .env has to be loaded before clap reads its `env` fallbacks
    dotenv().ok();
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::from_env()?.with_api_url(cli.api_url);
    if let Some(path) = cli.session_file {
        config = config.with_session_file(path);
    }

    let mut app = App::from_config(&config)?;

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => {
                    input::prompt("Password: ")?;
                    input::get_input()?
                }
            };

            app.login(&username, &password)?;
            println!("Logged in successfully");
            Ok(())
        }

        Commands::Logout => {
            app.logout()?;
            println!("Logged out");
            Ok(())
        }

        Commands::Status => {
            match app.start()? {
                Restore::Restored => {
                    if let Some(credential) = app.session().credential() {
                        println!(
                            "Logged in, session expires at {}",
                            credential.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
                        );
                    }
                }
                Restore::NoSession => println!("Not logged in"),
                Restore::Expired => println!("{}", AppError::SessionExpired),
                Restore::Discarded => {
                    println!("Stored session was unreadable and has been removed. Not logged in")
                }
            }
            Ok(())
        }

        Commands::List {
            sort,
            reverse,
            query,
        } => {
            require_session(&mut app)?;
            let contacts = app.refresh(&CancelToken::new())?;

            let mut rows: Vec<&Contact> = contacts
                .iter()
                .filter(|c| query.as_deref().is_none_or(|q| c.matches(q)))
                .collect();

            if rows.is_empty() {
                match query {
                    Some(q) => println!("Found no contact matching {{{}}}", q),
                    None => println!("No contact yet"),
                }
                return Ok(());
            }

            if let Some(key) = sort {
                match key {
                    SortKey::Name => {
                        rows.sort_by_key(|c| c.full_name.to_lowercase());
                    }
                    SortKey::Organization => {
                        rows.sort_by_key(|c| {
                            c.organization.as_deref().unwrap_or_default().to_lowercase()
                        });
                    }
                }
            }

            if reverse {
                rows.reverse();
            }

            for (mut i, c) in rows.iter().enumerate() {
                i += 1;
                println!(
                    "{i:>3}. {:<24} {:<16} {:<30} {:<20} [{}]",
                    c.full_name,
                    c.phone.as_deref().unwrap_or_default(),
                    c.email.as_deref().unwrap_or_default(),
                    c.organization.as_deref().unwrap_or_default(),
                    c.id
                );
            }
            Ok(())
        }

        Commands::Show { id } => {
            require_session(&mut app)?;
            app.refresh(&CancelToken::new())?;

            let contact = app
                .contacts()
                .get(&id)
                .ok_or_else(|| AppError::NotFound("Contact".to_string()))?;

            println!("{}", display_contact(contact));
            Ok(())
        }

        Commands::Add { name, fields } => {
            require_session(&mut app)?;

            let draft = apply_fields(ContactDraft::new(name), fields).normalized();
            let created = app.create_contact(&draft, &CancelToken::new())?;

            println!("Contact added successfully [{}]", created.id);
            Ok(())
        }

        Commands::Edit { id, name, fields } => {
            require_session(&mut app)?;
            app.refresh(&CancelToken::new())?;

            // Pre-fill from the current record like an edit form would. An id
            // the listing does not know still goes to the server when a name
            // is given; the server decides whether it exists.
            let base = match (app.contacts().get(&id), name) {
                (Some(current), Some(name)) => ContactDraft {
                    full_name: name,
                    ..current.draft()
                },
                (Some(current), None) => current.draft(),
                (None, Some(name)) => ContactDraft::new(name),
                (None, None) => return Err(AppError::NotFound("Contact".to_string())),
            };

            let draft = apply_fields(base, fields).normalized();
            app.update_contact(&id, &draft, &CancelToken::new())?;

            println!("Contact updated successfully");
            Ok(())
        }

        Commands::Delete { id, yes } => {
            require_session(&mut app)?;

            if !yes && !input::confirm_action(&format!("delete contact [{}]", id))? {
                println!("Delete cancelled");
                return Ok(());
            }

            app.delete_contact(&id, &CancelToken::new())?;
            println!("Contact deleted successfully");
            Ok(())
        }
    }
}

/// Every contact command starts from whatever session the last run left.
fn require_session(app: &mut App) -> Result<(), AppError> {
    match app.start()? {
        Restore::Restored => Ok(()),
        Restore::Expired => Err(AppError::SessionExpired),
        Restore::NoSession | Restore::Discarded => Err(AppError::NotAuthenticated),
    }
}

fn apply_fields(mut draft: ContactDraft, fields: ContactFields) -> ContactDraft {
    if let Some(email) = fields.email {
        draft.email = Some(email);
    }
    if let Some(phone) = fields.phone {
        draft.phone = Some(phone);
    }
    if let Some(organization) = fields.organization {
        draft.organization = Some(organization);
    }
    if let Some(title) = fields.title {
        draft.title = Some(title);
    }
    if let Some(notes) = fields.notes {
        draft.notes = Some(notes);
    }
    draft
}

pub fn display_contact(contact: &Contact) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    format!(
        "Id: {}\n\
        Name: {}\n\
        Email: {}\n\
        Phone: {}\n\
        Organization: {}\n\
        Title: {}\n\
        Notes: {}\n\
        Last modified: {}",
        contact.id,
        contact.full_name,
        field(&contact.email),
        field(&contact.phone),
        field(&contact.organization),
        field(&contact.title),
        field(&contact.notes),
        field(&contact.last_modified),
    )
}

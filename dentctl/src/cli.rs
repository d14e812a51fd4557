//! Command-line surface of the `dentctl` binary.
//!
//! Every command maps onto one library operation and yields a JSON value for stdout. Writes go
//! through a [`Mutation`] and then invalidate the affected queries, the same way an interactive
//! front end would.

use crate::Portal;
use crate::api::models::categories::{CategoryCreate, CategoryListQuery, CategoryUpdate};
use crate::api::models::lab_technicians::{LabTechnicianCreate, LabTechnicianListQuery, LabTechnicianUpdate};
use crate::api::models::pagination::{ListParams, SortOrder};
use crate::api::models::uploads::UploadFile;
use crate::configurator::{Arch, ConfiguratorPreview, PatientInfo, ToothNumber};
use crate::query::{Mutation, QueryState};
use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage material categories
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Manage lab technician accounts
    #[command(subcommand)]
    Technicians(TechnicianCommand),
    /// Upload or delete stored files
    #[command(subcommand)]
    Uploads(UploadCommand),
    /// Build a configurator preview and print its summary
    Preview(PreviewArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub page: Option<u32>,
    /// Items per page (defaults to list.default_limit)
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub sort_by: Option<String>,
    /// asc or desc
    #[arg(long)]
    pub sort_order: Option<SortOrder>,
}

impl ListArgs {
    fn params(&self, default_limit: u32) -> ListParams {
        ListParams::builder()
            .maybe_page(self.page)
            .limit(self.limit.unwrap_or(default_limit))
            .maybe_sort_by(self.sort_by.clone())
            .maybe_sort_order(self.sort_order)
            .build()
    }
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    List(ListArgs),
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct TechnicianFields {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Clinic id
    #[arg(long)]
    pub clinic: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TechnicianCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Only technicians of this clinic id
        #[arg(long)]
        clinic: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Get {
        id: String,
    },
    Create {
        #[command(flatten)]
        fields: TechnicianFields,
        #[arg(long)]
        password: String,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: TechnicianFields,
    },
    Delete {
        id: String,
    },
    SetPassword {
        id: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UploadCommand {
    Single {
        path: PathBuf,
        #[arg(long)]
        folder: Option<String>,
    },
    Multiple {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        folder: Option<String>,
    },
    Delete {
        key: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    #[arg(long)]
    pub patient: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    pub clinic: Option<String>,
    /// Category id of the restoration material
    #[arg(long)]
    pub material: Option<String>,
    /// FDI tooth numbers, e.g. --teeth 11,12,21
    #[arg(long, value_delimiter = ',')]
    pub teeth: Vec<ToothNumber>,
    #[arg(long)]
    pub upper: bool,
    #[arg(long)]
    pub lower: bool,
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    serde_json::to_value(value).context("Failed to serialize output")
}

/// Run one command against the portal.
pub async fn run(portal: &Portal, command: Command) -> anyhow::Result<Value> {
    match command {
        Command::Categories(command) => run_categories(portal, command).await,
        Command::Technicians(command) => run_technicians(portal, command).await,
        Command::Uploads(command) => run_uploads(portal, command).await,
        Command::Preview(args) => run_preview(portal, args).await,
    }
}

async fn run_categories(portal: &Portal, command: CategoryCommand) -> anyhow::Result<Value> {
    let categories = portal.categories();
    let mutation = Mutation::new();

    match command {
        CategoryCommand::List(list) => {
            let query = CategoryListQuery::new(list.params(portal.config().list.default_limit));
            to_json(&*categories.list(&query).await?)
        }
        CategoryCommand::Get { id } => match categories.detail(&id).await {
            QueryState::Success(category) => to_json(&*category),
            QueryState::Error(e) => Err(e.into()),
            _ => bail!("A category id is required"),
        },
        CategoryCommand::Create { name, description } => {
            let created = categories.create(&mutation, &CategoryCreate { name, description }).await?;
            categories.invalidate_lists().await;
            info!(category_id = %created.id, "Category created");
            to_json(&*created)
        }
        CategoryCommand::Update { id, name, description } => {
            let update = CategoryUpdate { name, description };
            if update.is_empty() {
                bail!("Nothing to update: pass --name and/or --description");
            }
            let updated = categories.update(&mutation, &id, &update).await?;
            categories.invalidate_lists().await;
            categories.invalidate_detail(&id).await;
            to_json(&*updated)
        }
        CategoryCommand::Delete { id } => {
            let deleted = categories.delete(&mutation, &id).await?;
            categories.invalidate_all().await;
            info!(category_id = %deleted.id, "Category deleted");
            to_json(&*deleted)
        }
    }
}

async fn run_technicians(portal: &Portal, command: TechnicianCommand) -> anyhow::Result<Value> {
    let technicians = portal.lab_technicians();
    let mutation = Mutation::new();

    match command {
        TechnicianCommand::List { list, clinic, search } => {
            let query = LabTechnicianListQuery {
                params: list.params(portal.config().list.default_limit),
                clinic,
                search,
            };
            to_json(&*technicians.list(&query).await?)
        }
        TechnicianCommand::Get { id } => match technicians.detail(&id).await {
            QueryState::Success(technician) => to_json(&*technician),
            QueryState::Error(e) => Err(e.into()),
            _ => bail!("A technician id is required"),
        },
        TechnicianCommand::Create { fields, password } => {
            let request = LabTechnicianCreate {
                first_name: fields.first_name.context("--first-name is required")?,
                last_name: fields.last_name.context("--last-name is required")?,
                username: fields.username.context("--username is required")?,
                password,
                email: fields.email,
                phone: fields.phone,
                clinic: fields.clinic,
                notes: fields.notes,
            };
            let created = technicians.create(&mutation, &request).await?;
            technicians.invalidate_lists().await;
            to_json(&*created)
        }
        TechnicianCommand::Update { id, fields } => {
            let update = LabTechnicianUpdate {
                first_name: fields.first_name,
                last_name: fields.last_name,
                username: fields.username,
                email: fields.email,
                phone: fields.phone,
                clinic: fields.clinic,
                notes: fields.notes,
            };
            if update.is_empty() {
                bail!("Nothing to update");
            }
            let updated = technicians.update(&mutation, &id, &update).await?;
            technicians.invalidate_lists().await;
            technicians.invalidate_detail(&id).await;
            to_json(&*updated)
        }
        TechnicianCommand::Delete { id } => {
            let deleted = technicians.delete(&mutation, &id).await?;
            technicians.invalidate_all().await;
            to_json(&*deleted)
        }
        TechnicianCommand::SetPassword { id, password } => {
            let response = technicians.resource().change_password(&id, &password).await?;
            to_json(&response)
        }
    }
}

async fn run_uploads(portal: &Portal, command: UploadCommand) -> anyhow::Result<Value> {
    let uploads = portal.uploads();

    match command {
        UploadCommand::Single { path, folder } => {
            let file = UploadFile::from_path(&path).await?;
            to_json(&uploads.single(file, folder.as_deref()).await?)
        }
        UploadCommand::Multiple { paths, folder } => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                files.push(UploadFile::from_path(path).await?);
            }
            to_json(&uploads.multiple(files, folder.as_deref()).await?)
        }
        UploadCommand::Delete { key } => {
            uploads.delete(&key).await?;
            Ok(json!({ "deleted": key }))
        }
    }
}

async fn run_preview(portal: &Portal, args: PreviewArgs) -> anyhow::Result<Value> {
    let mut preview = ConfiguratorPreview::new(PatientInfo {
        name: args.patient,
        date_of_birth: args.date_of_birth,
        clinic: args.clinic,
    });

    if let Some(material) = args.material.as_deref() {
        match portal.categories().detail(material).await {
            QueryState::Success(category) => preview.select_material(&category),
            QueryState::Error(e) => return Err(anyhow::Error::from(e).context(format!("Failed to load material {material}"))),
            _ => {}
        }
    }

    for tooth in args.teeth {
        preview.teeth.select(tooth);
    }
    if args.upper {
        preview.teeth.select_arch(Arch::Upper);
    }
    if args.lower {
        preview.teeth.select_arch(Arch::Lower);
    }

    Ok(json!({
        "preview": to_json(&preview)?,
        "summary": preview.summary(),
        "complete": preview.is_complete(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Args as CliArgs, Config};
    use crate::test_utils::{api_config, category_json, page_json};
    use clap::Parser;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn portal(server: &MockServer) -> Portal {
        let config = Config {
            api: api_config(&server.uri()),
            ..Default::default()
        };
        Portal::new(config).unwrap()
    }

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["dentctl"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_from(argv).unwrap().command.unwrap()
    }

    #[test]
    fn test_parse_technician_list() {
        let command = parse(&[
            "technicians", "list", "--page", "2", "--sort-by", "lastName", "--sort-order", "desc", "--clinic", "clinic-7",
        ]);
        let Command::Technicians(TechnicianCommand::List { list, clinic, search }) = command else {
            panic!("unexpected command");
        };
        assert_eq!(list.page, Some(2));
        assert_eq!(list.sort_order, Some(SortOrder::Desc));
        assert_eq!(clinic.as_deref(), Some("clinic-7"));
        assert_eq!(search, None);
        assert_eq!(list.params(10).query_pairs().to_string(), "page=2&limit=10&sortBy=lastName&sortOrder=desc");
    }

    #[test]
    fn test_parse_rejects_bad_tooth() {
        let argv = ["dentctl", "preview", "--patient", "Ana", "--teeth", "11,59"];
        assert!(CliArgs::try_parse_from(argv).is_err());
    }

    #[tokio::test]
    async fn test_categories_list_outputs_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![category_json("c1", "Crowns")], 1, 1, 10)))
            .expect(1)
            .mount(&server)
            .await;

        let output = run(&portal(&server), parse(&["categories", "list"])).await.unwrap();
        assert_eq!(output["data"][0]["name"], "Crowns");
        assert_eq!(output["pagination"]["currentPage"], 1);
    }

    #[tokio::test]
    async fn test_update_without_fields_is_rejected_locally() {
        let server = MockServer::start().await;
        let err = run(&portal(&server), parse(&["categories", "update", "c1"])).await.unwrap_err();
        assert!(err.to_string().contains("Nothing to update"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preview_with_material() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories/c9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(category_json("c9", "Zirconia")))
            .mount(&server)
            .await;

        let output = run(
            &portal(&server),
            parse(&["preview", "--patient", "Maria Ionescu", "--material", "c9", "--teeth", "21,11"]),
        )
        .await
        .unwrap();

        assert_eq!(output["complete"], true);
        assert_eq!(output["preview"]["teeth"], json!([11, 21]));
        assert_eq!(output["summary"][1], "Material: Zirconia");
        assert_eq!(output["summary"][2], "Teeth: 11, 21 (2)");
    }
}

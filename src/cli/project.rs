use anyhow::{bail, Result};
use clap::Subcommand;

use crate::storage::{
    entities::{LifeArea, Project, ProjectStatus, Task},
    json_store::EntityStore,
    Stores,
};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    #[command(about = "Create a new project")]
    Add {
        name: String,
        #[arg(long, value_enum, default_value_t = LifeArea::WorkCareer)]
        area: LifeArea,
        #[arg(long, value_enum, default_value_t = ProjectStatus::Active)]
        status: ProjectStatus,
    },
    #[command(about = "List projects with their tasks")]
    List {
        #[arg(long, help = "Include completed projects")]
        all: bool,
    },
    #[command(about = "Change a project's status")]
    Status {
        name: String,
        #[arg(value_enum)]
        status: ProjectStatus,
    },
    #[command(about = "Mark a project as completed")]
    Done { name: String },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    #[command(about = "Add a task to a project")]
    Add {
        #[arg(help = "Project the task belongs to")]
        project: String,
        name: String,
        #[arg(long, default_value_t = 0., help = "Estimated hours")]
        estimate: f64,
    },
    #[command(about = "Mark a task as completed")]
    Done { project: String, name: String },
}

pub async fn process_project_command(command: ProjectCommand, stores: &Stores) -> Result<()> {
    match command {
        ProjectCommand::Add { name, area, status } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                bail!("Project name can't be empty");
            }

            let mut projects = stores.projects.load_all().await?;
            // The name is the join key for time logs, so duplicates among
            // non-completed projects would make matching ambiguous.
            if projects
                .iter()
                .filter(|p| p.status != ProjectStatus::Completed)
                .any(|p| p.name.trim().eq_ignore_ascii_case(&name))
            {
                bail!("A project named {name:?} already exists");
            }

            projects.push(Project::new(&name, area, status));
            stores.projects.save_all(&projects).await?;
            println!("Added {status} project {name:?} under {area}");
            Ok(())
        }
        ProjectCommand::List { all } => {
            let projects = stores.projects.load_all().await?;
            for project in projects
                .iter()
                .filter(|p| all || p.status != ProjectStatus::Completed)
            {
                println!("{}\t{}\t{}", project.name, project.status, project.area);
                for task in &project.tasks {
                    let mark = if task.completed { "x" } else { " " };
                    println!(
                        "    [{mark}] {}\t{:.1}h invested, {:.1}h spent of ~{:.1}h",
                        task.name, task.invested_hours, task.spent_hours, task.estimated_hours
                    );
                }
            }
            Ok(())
        }
        ProjectCommand::Status { name, status } => set_project_status(stores, &name, status).await,
        ProjectCommand::Done { name } => {
            set_project_status(stores, &name, ProjectStatus::Completed).await
        }
    }
}

async fn set_project_status(stores: &Stores, name: &str, status: ProjectStatus) -> Result<()> {
    let mut projects = stores.projects.load_all().await?;
    let project = find_project_mut(&mut projects, name)?;
    project.status = status;
    let name = project.name.clone();
    stores.projects.save_all(&projects).await?;
    println!("{name:?} is now {status}");
    Ok(())
}

pub async fn process_task_command(command: TaskCommand, stores: &Stores) -> Result<()> {
    match command {
        TaskCommand::Add {
            project,
            name,
            estimate,
        } => {
            if estimate < 0. {
                bail!("Estimated hours can't be negative");
            }
            let mut projects = stores.projects.load_all().await?;
            let target = find_project_mut(&mut projects, &project)?;
            if target.find_task_mut(&name).is_some() {
                bail!("Task {name:?} already exists in {:?}", target.name);
            }
            target.tasks.push(Task::new(name.trim(), estimate));
            let project_name = target.name.clone();
            stores.projects.save_all(&projects).await?;
            println!("Added task {:?} to {project_name:?}", name.trim());
            Ok(())
        }
        TaskCommand::Done { project, name } => {
            let mut projects = stores.projects.load_all().await?;
            let target = find_project_mut(&mut projects, &project)?;
            match target.find_task_mut(&name) {
                Some(task) => task.completed = true,
                None => bail!("No task named {name:?} in {project:?}"),
            }
            stores.projects.save_all(&projects).await?;
            println!("Completed {name:?}");
            Ok(())
        }
    }
}

pub fn find_project_mut<'a>(projects: &'a mut [Project], name: &str) -> Result<&'a mut Project> {
    let trimmed = name.trim();
    match projects
        .iter_mut()
        .find(|p| p.name.trim().eq_ignore_ascii_case(trimmed))
    {
        Some(project) => Ok(project),
        None => bail!("No project named {trimmed:?}"),
    }
}

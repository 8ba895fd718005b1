use anyhow::{bail, Result};
use chrono::{Local, Utc};
use clap::Subcommand;
use uuid::Uuid;

use crate::storage::{
    entities::{LifeArea, Project, ProjectStatus, StrategySession},
    json_store::EntityStore,
    Stores,
};

#[derive(Subcommand, Debug)]
pub enum StrategyCommand {
    #[command(about = "Record a weekly strategy session")]
    New {
        #[arg(
            short,
            long = "dissatisfaction",
            help = "Something that isn't working. Repeatable"
        )]
        dissatisfactions: Vec<String>,
        #[arg(
            short = 'y',
            long = "hypothesis",
            help = "A change worth trying. Repeatable"
        )]
        hypotheses: Vec<String>,
        #[arg(
            long = "spawn",
            help = "Name of a project to create out of this session. Repeatable"
        )]
        spawn: Vec<String>,
        #[arg(long, value_enum, default_value_t = LifeArea::WorkCareer, help = "Life area for spawned projects")]
        area: LifeArea,
    },
    #[command(about = "List past sessions")]
    List {},
}

pub async fn process_strategy_command(command: StrategyCommand, stores: &Stores) -> Result<()> {
    match command {
        StrategyCommand::New {
            dissatisfactions,
            hypotheses,
            spawn,
            area,
        } => {
            if dissatisfactions.is_empty() && hypotheses.is_empty() && spawn.is_empty() {
                bail!("A session needs at least one dissatisfaction, hypothesis, or spawned project");
            }

            let mut projects = stores.projects.load_all().await?;
            let mut spawned_projects = Vec::new();
            for name in &spawn {
                let name = name.trim();
                if projects
                    .iter()
                    .any(|p| p.name.trim().eq_ignore_ascii_case(name))
                {
                    bail!("A project named {name:?} already exists");
                }
                // Projects born in a session start in planning, activation is
                // a deliberate step.
                let project = Project::new(name, area, ProjectStatus::Planning);
                spawned_projects.push(project.id);
                projects.push(project);
            }

            if !spawned_projects.is_empty() {
                stores.projects.save_all(&projects).await?;
            }

            stores
                .strategy
                .append(StrategySession {
                    id: Uuid::new_v4(),
                    held_at: Utc::now(),
                    dissatisfactions,
                    hypotheses,
                    spawned_projects,
                })
                .await?;
            println!("Session recorded");
            Ok(())
        }
        StrategyCommand::List {} => {
            let sessions = stores.strategy.load_all().await?;
            let projects = stores.projects.load_all().await?;

            for session in &sessions {
                println!(
                    "Session of {}",
                    session.held_at.with_timezone(&Local).format("%x")
                );
                for dissatisfaction in &session.dissatisfactions {
                    println!("    - {dissatisfaction}");
                }
                for hypothesis in &session.hypotheses {
                    println!("    ? {hypothesis}");
                }
                for id in &session.spawned_projects {
                    let name = projects
                        .iter()
                        .find(|p| p.id == *id)
                        .map(|p| p.name.as_str())
                        .unwrap_or("(deleted project)");
                    println!("    + {name}");
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::storage::{
        entities::{LifeArea, ProjectStatus},
        json_store::EntityStore,
        Stores,
    };

    use super::{process_strategy_command, StrategyCommand};

    #[tokio::test]
    async fn test_session_spawns_planning_projects() -> Result<()> {
        let dir = tempdir()?;
        let stores = Stores::open(dir.path())?;

        process_strategy_command(
            StrategyCommand::New {
                dissatisfactions: vec!["Too little writing".into()],
                hypotheses: vec!["Morning sessions might stick".into()],
                spawn: vec!["Writing (Book)".into()],
                area: LifeArea::LearningGrowth,
            },
            &stores,
        )
        .await?;

        let projects = stores.projects.load_all().await?;
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].status, ProjectStatus::Planning);

        let sessions = stores.strategy.load_all().await?;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].spawned_projects, vec![projects[0].id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_session_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let stores = Stores::open(dir.path())?;

        let result = process_strategy_command(
            StrategyCommand::New {
                dissatisfactions: vec![],
                hypotheses: vec![],
                spawn: vec![],
                area: LifeArea::WorkCareer,
            },
            &stores,
        )
        .await;

        assert!(result.is_err());
        Ok(())
    }
}

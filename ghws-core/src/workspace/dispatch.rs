//! Workspace commands and the pure mapping from command to reconciliation run

use super::reconcile::{Policy, Reconciler, RepoOutcome, WorkItem};
use crate::git::LocalOps;

/// The workspace-level operations the tool offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceCommand {
    CloneAll,
    CloneSelected(Vec<String>),
    PullAll,
    PushAll { message: Option<String> },
    SyncAll { message: Option<String> },
}

impl WorkspaceCommand {
    pub fn policy(&self) -> Policy {
        match self {
            WorkspaceCommand::CloneAll | WorkspaceCommand::CloneSelected(_) => Policy::Clone,
            WorkspaceCommand::PullAll => Policy::Pull,
            WorkspaceCommand::PushAll { .. } => Policy::Push,
            WorkspaceCommand::SyncAll { .. } => Policy::Sync,
        }
    }

    /// Whether the targets come from the remote listing rather than the workspace
    pub fn targets_remote(&self) -> bool {
        self.policy() == Policy::Clone
    }
}

/// A resolved command: the policy and the repositories it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub policy: Policy,
    pub items: Vec<WorkItem>,
    pub message: Option<String>,
    /// Selected names that matched no remote repository
    pub unknown: Vec<String>,
}

impl Plan {
    pub fn execute<O: LocalOps>(&self, reconciler: &Reconciler<'_, O>) -> Vec<RepoOutcome> {
        reconciler.reconcile(self.policy, &self.items, self.message.as_deref())
    }
}

/// Resolve `command` against the remote listing and the workspace contents
pub fn plan(command: &WorkspaceCommand, remote: &[WorkItem], local: &[WorkItem]) -> Plan {
    let policy = command.policy();
    match command {
        WorkspaceCommand::CloneAll => Plan {
            policy,
            items: remote.to_vec(),
            message: None,
            unknown: Vec::new(),
        },
        WorkspaceCommand::CloneSelected(names) => {
            let mut items = Vec::new();
            let mut unknown = Vec::new();
            for name in names {
                match remote.iter().find(|item| &item.name == name) {
                    Some(item) if !items.contains(item) => items.push(item.clone()),
                    Some(_) => {}
                    None => unknown.push(name.clone()),
                }
            }
            Plan {
                policy,
                items,
                message: None,
                unknown,
            }
        }
        WorkspaceCommand::PullAll => Plan {
            policy,
            items: local.to_vec(),
            message: None,
            unknown: Vec::new(),
        },
        WorkspaceCommand::PushAll { message } | WorkspaceCommand::SyncAll { message } => Plan {
            policy,
            items: local.to_vec(),
            message: message.clone(),
            unknown: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubOps;
    use crate::workspace::Action;

    fn remote() -> Vec<WorkItem> {
        ["api", "web", "docs"]
            .iter()
            .map(|n| WorkItem::remote(*n, format!("https://github.com/me/{}.git", n)))
            .collect()
    }

    #[test]
    fn test_policies() {
        assert_eq!(WorkspaceCommand::CloneAll.policy(), Policy::Clone);
        assert_eq!(WorkspaceCommand::CloneSelected(vec![]).policy(), Policy::Clone);
        assert_eq!(WorkspaceCommand::PullAll.policy(), Policy::Pull);
        assert_eq!(WorkspaceCommand::PushAll { message: None }.policy(), Policy::Push);
        assert_eq!(WorkspaceCommand::SyncAll { message: None }.policy(), Policy::Sync);
        assert!(WorkspaceCommand::CloneAll.targets_remote());
        assert!(!WorkspaceCommand::PullAll.targets_remote());
    }

    #[test]
    fn test_clone_selected_reports_unknown_and_dedups() {
        let plan = plan(
            &WorkspaceCommand::CloneSelected(vec![
                "web".to_string(),
                "nope".to_string(),
                "web".to_string(),
            ]),
            &remote(),
            &[],
        );
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].name, "web");
        assert_eq!(plan.unknown, vec!["nope"]);
    }

    #[test]
    fn test_local_commands_use_workspace_items() {
        let local = vec![WorkItem::local("api")];
        let plan = plan(
            &WorkspaceCommand::SyncAll {
                message: Some("wip".to_string()),
            },
            &remote(),
            &local,
        );
        assert_eq!(plan.policy, Policy::Sync);
        assert_eq!(plan.items, local);
        assert_eq!(plan.message.as_deref(), Some("wip"));
    }

    #[test]
    fn test_execute_clone_all() {
        let ws = tempfile::tempdir().unwrap();
        let ops = StubOps::default();
        let reconciler = Reconciler::new(&ops, ws.path(), "msg");

        let outcomes = plan(&WorkspaceCommand::CloneAll, &remote(), &[]).execute(&reconciler);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.has(&Action::Cloned)));
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the operation boundary.

use carbid::CoreError;
use carbid_domain::DomainError;
use carbid_files::FileStoreError;
use carbid_persistence::PersistenceError;

/// Boundary-level errors.
///
/// These are distinct from domain/core errors and represent the
/// operation contract: inner errors are translated explicitly and never
/// leaked through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A lifecycle or wizard rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request raced another actor and lost, or does not match the
    /// current state.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The actor is not allowed to touch this resource.
    Forbidden {
        /// A human-readable description of what was refused.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Forbidden { message } => write!(f, "Forbidden: {message}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into a boundary error.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown status '{value}'"),
        },
        DomainError::IllegalTransition { from, to } => ApiError::DomainRuleViolation {
            rule: String::from("lifecycle"),
            message: format!("Cannot move a bid from {from} to {to}"),
        },
        DomainError::BidNotFound(bid_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Bid"),
            message: format!("Bid {bid_id} does not exist"),
        },
        DomainError::NotBidManager {
            bid_id,
            operator_id,
        } => ApiError::Forbidden {
            message: format!("Operator {operator_id} does not hold bid {bid_id}"),
        },
        DomainError::AlreadyClaimed { bid_id } => ApiError::Conflict {
            message: format!("Bid {bid_id} is already claimed"),
        },
        DomainError::UnpersistedBid => ApiError::Internal {
            message: String::from("Bid has no persistent id"),
        },
        DomainError::ManagerStatusViolation { status, has_manager } => ApiError::Internal {
            message: format!(
                "Manager invariant violated: status {status}, manager assigned: {has_manager}"
            ),
        },
        DomainError::InvalidChecklistIndex(index) => ApiError::InvalidInput {
            field: String::from("question"),
            message: format!("No checklist question with index {index}"),
        },
        DomainError::StageNotFound(index) => ApiError::InvalidInput {
            field: String::from("stage"),
            message: format!("No stage with index {index}"),
        },
        DomainError::StageIncomplete { stage_title } => ApiError::DomainRuleViolation {
            rule: String::from("stage_complete"),
            message: format!("Stage '{stage_title}' requires at least one file"),
        },
        DomainError::EmptyStagePlan => ApiError::Internal {
            message: String::from("The stage plan has no stages"),
        },
        DomainError::AmbiguousStagePrefix { first, second } => ApiError::InvalidInput {
            field: String::from("stage_plan"),
            message: format!("Stage titles '{first}' and '{second}' collide in storage"),
        },
        DomainError::BidClosed(bid_id) => ApiError::DomainRuleViolation {
            rule: String::from("bid_active"),
            message: format!("Bid {bid_id} is closed"),
        },
    }
}

/// Translates a core error into a boundary error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::ChecklistIncomplete { bid_id } => ApiError::DomainRuleViolation {
            rule: String::from("checklist_complete"),
            message: format!("Checklist for bid {bid_id} is not complete"),
        },
        CoreError::NoActiveSession(operator_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Wizard session"),
            message: format!("Operator {operator_id} has no wizard session in flight"),
        },
        CoreError::SessionAlreadyActive {
            operator_id,
            bid_id,
        } => ApiError::Conflict {
            message: format!("Operator {operator_id} already has a session for bid {bid_id}"),
        },
        CoreError::UnexpectedStep {
            operator_id,
            expected,
        } => ApiError::Conflict {
            message: format!("Session for operator {operator_id} is waiting on {expected}"),
        },
    }
}

/// Translates a persistence error into a boundary error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::BidNotFound(bid_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Bid"),
            message: format!("Bid {bid_id} does not exist"),
        },
        PersistenceError::OperatorNotFound(operator_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Operator"),
            message: format!("Operator {operator_id} does not exist"),
        },
        PersistenceError::CompanyNotFound(company_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Company"),
            message: format!("Company {company_id} does not exist"),
        },
        PersistenceError::ClaimLost(bid_id) => ApiError::Conflict {
            message: format!("Bid {bid_id} was claimed by someone else"),
        },
        PersistenceError::NotFound(what) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: what,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

/// Translates a file-store error into a boundary error.
#[must_use]
pub fn translate_file_error(err: FileStoreError) -> ApiError {
    match err {
        FileStoreError::TooLarge { name, size, max } => ApiError::InvalidInput {
            field: String::from("file"),
            message: format!("File '{name}' is {size} bytes; the limit is {max}"),
        },
        FileStoreError::EmptyFileName => ApiError::InvalidInput {
            field: String::from("file_name"),
            message: String::from("Nothing usable remains of the file name"),
        },
        FileStoreError::Io { path, message } => ApiError::Internal {
            message: format!("Storage failure at {path}: {message}"),
        },
    }
}

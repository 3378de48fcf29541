//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod application;
pub mod financial_goal;
pub mod goal_expense;
pub mod goal_funding_source;
pub mod notification;
pub mod scholarship;
pub mod sea_orm_active_enums;
pub mod session;
pub mod user;
pub mod user_connection;

// Re-export specific types to avoid conflicts
pub use application::{
    Column as ApplicationColumn, Entity as Application, Model as ApplicationModel,
};
pub use financial_goal::{
    Column as FinancialGoalColumn, Entity as FinancialGoal, Model as FinancialGoalModel,
};
pub use goal_expense::{
    Column as GoalExpenseColumn, Entity as GoalExpense, Model as GoalExpenseModel,
};
pub use goal_funding_source::{
    Column as GoalFundingSourceColumn, Entity as GoalFundingSource,
    Model as GoalFundingSourceModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use scholarship::{
    Column as ScholarshipColumn, Entity as Scholarship, Model as ScholarshipModel,
};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use user_connection::{
    Column as UserConnectionColumn, Entity as UserConnection, Model as UserConnectionModel,
};

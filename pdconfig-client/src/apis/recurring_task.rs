//! Recurring task operations

use async_trait::async_trait;
use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{
    AddGenerateServerProfileRecurringTaskRequest, GenerateServerProfileRecurringTaskResponse,
    UpdateRequest,
};

const RECURRING_TASKS_PATH: &str = "recurring-tasks";

/// Recurring task endpoints of the configuration API
#[async_trait]
pub trait RecurringTaskApi: Send + Sync {
    /// `POST /config/recurring-tasks`
    async fn add_recurring_task(
        &self,
        request: &AddGenerateServerProfileRecurringTaskRequest,
    ) -> Result<GenerateServerProfileRecurringTaskResponse, ApiError>;

    /// `GET /config/recurring-tasks/{name}`
    async fn get_recurring_task(
        &self,
        name: &str,
    ) -> Result<GenerateServerProfileRecurringTaskResponse, ApiError>;

    /// `PATCH /config/recurring-tasks/{name}`
    async fn update_recurring_task(
        &self,
        name: &str,
        request: &UpdateRequest,
    ) -> Result<GenerateServerProfileRecurringTaskResponse, ApiError>;

    /// `DELETE /config/recurring-tasks/{name}`
    async fn delete_recurring_task(&self, name: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl RecurringTaskApi for ApiClient {
    async fn add_recurring_task(
        &self,
        request: &AddGenerateServerProfileRecurringTaskRequest,
    ) -> Result<GenerateServerProfileRecurringTaskResponse, ApiError> {
        let url = self.endpoint(&[RECURRING_TASKS_PATH])?;
        let response = self.request(Method::POST, url).json(request).send().await?;
        Self::handle_response(response).await
    }

    async fn get_recurring_task(
        &self,
        name: &str,
    ) -> Result<GenerateServerProfileRecurringTaskResponse, ApiError> {
        let url = self.endpoint(&[RECURRING_TASKS_PATH, name])?;
        let response = self.request(Method::GET, url).send().await?;
        Self::handle_response(response).await
    }

    async fn update_recurring_task(
        &self,
        name: &str,
        request: &UpdateRequest,
    ) -> Result<GenerateServerProfileRecurringTaskResponse, ApiError> {
        let url = self.endpoint(&[RECURRING_TASKS_PATH, name])?;
        let response = self.request(Method::PATCH, url).json(request).send().await?;
        Self::handle_response(response).await
    }

    async fn delete_recurring_task(&self, name: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&[RECURRING_TASKS_PATH, name])?;
        let response = self.request(Method::DELETE, url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

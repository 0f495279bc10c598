use super::{user_facing, ClientExt};
use crate::dispatcher::parse_number;
use crate::models::{DashboardStats, MutationAck, NewExpense, Stats};
use tauri::AppHandle;

#[tauri::command]
pub async fn register_expense(
    app: AppHandle,
    description: String,
    amount: String,
    category: Option<String>,
) -> Result<MutationAck, String> {
    let client = app.client()?;
    let user_id = user_facing(&app, client.user_id())?;
    let amount = user_facing(&app, parse_number("Amount", &amount))?;

    let expense = NewExpense {
        description,
        amount,
        category,
    };
    let result = client
        .dispatcher()
        .register_expense(expense, &user_id)
        .await;
    user_facing(&app, result)
}

#[tauri::command]
pub async fn get_dashboard_stats(app: AppHandle) -> Result<DashboardStats, String> {
    let client = app.client()?;
    user_facing(&app, client.queries().get_dashboard_stats().await)
}

#[tauri::command]
pub async fn get_advanced_stats(app: AppHandle, period: Option<String>) -> Result<Stats, String> {
    let client = app.client()?;
    let result = client
        .queries()
        .get_advanced_stats(period.as_deref())
        .await;
    user_facing(&app, result)
}

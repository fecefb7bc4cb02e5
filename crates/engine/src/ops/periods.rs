use chrono::NaiveDate;
use sea_orm::{ActiveValue, ConnectionTrait, sea_query::OnConflict, prelude::*};

use crate::{
    ResultEngine, period_settings,
    util::{period_code_for, validate_period_day},
};

use super::Engine;

/// Day of the month on which a user's periods start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodSettings {
    pub day_of_month: u32,
}

impl Default for PeriodSettings {
    fn default() -> Self {
        Self { day_of_month: 1 }
    }
}

impl PeriodSettings {
    /// Period code of `date` under these settings.
    #[must_use]
    pub fn period_code(&self, date: NaiveDate) -> String {
        period_code_for(date, self.day_of_month)
    }
}

impl Engine {
    pub async fn period_settings(&self, user_id: i64) -> ResultEngine<PeriodSettings> {
        Self::load_period_settings(&self.database, user_id).await
    }

    /// Sets the period start day (1..=28).
    pub async fn set_period_day(&self, user_id: i64, day_of_month: u32) -> ResultEngine<PeriodSettings> {
        let day_of_month = validate_period_day(day_of_month)?;
        let stored = i32::try_from(day_of_month).unwrap_or(1);

        period_settings::Entity::insert(period_settings::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            day_of_month: ActiveValue::Set(stored),
        })
        .on_conflict(
            OnConflict::column(period_settings::Column::UserId)
                .update_column(period_settings::Column::DayOfMonth)
                .to_owned(),
        )
        .exec_without_returning(&self.database)
        .await?;

        tracing::info!(user_id, day_of_month, "period start day updated");
        Ok(PeriodSettings { day_of_month })
    }

    pub(super) async fn load_period_settings<C: ConnectionTrait>(
        db: &C,
        user_id: i64,
    ) -> ResultEngine<PeriodSettings> {
        let settings = period_settings::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .and_then(|model| u32::try_from(model.day_of_month).ok())
            .map_or_else(PeriodSettings::default, |day_of_month| PeriodSettings {
                day_of_month,
            });
        Ok(settings)
    }
}

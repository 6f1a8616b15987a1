//! Installation bookings between customers and installers.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{account, booking, AccountRole, BookingStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Fee owed to the installer for every booking, fixed at creation.
pub const FINDERS_FEE: Decimal = dec!(200);

/// Booking request as the customer submits it. Car fields left out fall
/// back to the car saved on the customer's account.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub installer_id: Uuid,
    pub product_id: Option<Uuid>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    pub car_year: Option<i32>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
}

#[derive(Clone)]
pub struct BookingService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl BookingService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Create a pending booking for `customer_id`.
    #[instrument(skip(self, request))]
    pub async fn create_booking(
        &self,
        customer_id: Uuid,
        request: NewBooking,
    ) -> Result<booking::Model, ServiceError> {
        let customer = account::Entity::find_by_id(customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Account {} not found", customer_id)))?;

        let installer = account::Entity::find_by_id(request.installer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Installer {} not found", request.installer_id))
            })?;
        if installer.role != AccountRole::Installer {
            return Err(ServiceError::InvalidInput(
                "Bookings can only be made with installer accounts".to_string(),
            ));
        }

        let car_brand = request.car_brand.or(customer.saved_car_brand);
        let car_model = request.car_model.or(customer.saved_car_model);
        let car_year = request.car_year.or(customer.saved_car_year);
        let (car_brand, car_model, car_year) = match (car_brand, car_model, car_year) {
            (Some(b), Some(m), Some(y)) => (b, m, y),
            _ => {
                return Err(ServiceError::ValidationError(
                    "Car details are required when no saved car is on file".to_string(),
                ))
            }
        };

        let created = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            installer_id: Set(request.installer_id),
            product_id: Set(request.product_id),
            car_brand: Set(car_brand),
            car_model: Set(car_model),
            car_year: Set(car_year),
            scheduled_date: Set(request.scheduled_date),
            scheduled_time: Set(request.scheduled_time),
            status: Set(BookingStatus::Pending),
            finders_fee: Set(FINDERS_FEE),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(booking_id = %created.id, %customer_id, "Booking created");
        self.event_sender
            .send_or_log(Event::BookingCreated(created.id))
            .await;
        Ok(created)
    }

    /// Accept or reject a pending booking.
    ///
    /// Only the assigned installer may decide, and a decided booking stays
    /// decided: re-transitions out of a terminal state are rejected.
    #[instrument(skip(self))]
    pub async fn decide(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
        accept: bool,
    ) -> Result<booking::Model, ServiceError> {
        let existing = booking::Entity::find_by_id(booking_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", booking_id)))?;

        if existing.installer_id != actor_id {
            return Err(ServiceError::Forbidden(
                "Only the assigned installer can decide this booking".to_string(),
            ));
        }
        if existing.status.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "Booking has already been {}",
                existing.status
            )));
        }

        let status = if accept {
            BookingStatus::Accepted
        } else {
            BookingStatus::Rejected
        };

        let mut active: booking::ActiveModel = existing.into();
        active.status = Set(status);
        let updated = active.update(&*self.db).await?;

        info!(%booking_id, %status, "Booking decided");
        self.event_sender
            .send_or_log(Event::BookingDecided { booking_id, status })
            .await;
        Ok(updated)
    }

    /// The customer's bookings, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<booking::Model>, ServiceError> {
        Ok(booking::Entity::find()
            .filter(booking::Column::CustomerId.eq(customer_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// The installer's bookings, optionally narrowed to one status,
    /// soonest scheduled first.
    #[instrument(skip(self))]
    pub async fn list_for_installer(
        &self,
        installer_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<booking::Model>, ServiceError> {
        let mut query = booking::Entity::find()
            .filter(booking::Column::InstallerId.eq(installer_id));
        if let Some(status) = status {
            query = query.filter(booking::Column::Status.eq(status));
        }
        Ok(query
            .order_by_asc(booking::Column::ScheduledDate)
            .order_by_asc(booking::Column::ScheduledTime)
            .all(&*self.db)
            .await?)
    }
}

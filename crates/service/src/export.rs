//! CSV exports for the admin console.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, FixedOffset};
use common::money::format_with_symbol;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use models::{
    booking::{self, BookingStatus},
    catalog, client,
};

use crate::clock;
use crate::db::booking_service::{find_bookings, views, BookingFilter, BookingPolicy};
use crate::db::client_service::stats_for;
use crate::errors::{ServiceError, ServiceResult};

/// A rendered CSV document and its download name.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

/// `"1,2, 3"` into ids; blank means no selection.
pub fn parse_ids(raw: Option<&str>) -> ServiceResult<Option<Vec<i32>>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i32>().map_err(|_| ServiceError::Validation(format!("ids: '{}' is not an id", s))))
        .collect::<ServiceResult<Vec<_>>>()
        .map(Some)
}

fn filename(kind: &str, now: DateTime<FixedOffset>) -> String {
    format!("{}_{}.csv", kind, now.format("%Y%m%d_%H%M%S"))
}

fn finish(w: csv::Writer<Vec<u8>>) -> ServiceResult<String> {
    let bytes = w.into_inner().map_err(|e| ServiceError::Db(format!("csv: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Db(format!("csv: {}", e)))
}

fn csv_err(e: csv::Error) -> ServiceError { ServiceError::Db(format!("csv: {}", e)) }

/// One row per client with totals over confirmed and completed bookings.
/// Dates are rendered in the offset of `now`.
pub async fn clients_csv(
    db: &DatabaseConnection,
    currency: &str,
    ids: Option<&[i32]>,
    now: DateTime<FixedOffset>,
) -> ServiceResult<CsvExport> {
    let mut q = client::Entity::find().order_by_asc(client::Column::Name);
    if let Some(ids) = ids {
        q = q.filter(client::Column::Id.is_in(ids.to_vec()));
    }
    let clients = q.all(db).await?;
    let client_ids: Vec<i32> = clients.iter().map(|c| c.id).collect();
    let offset = *now.offset();
    let mut stats = stats_for(db, offset, &client_ids).await?;

    let billable = booking::Entity::find()
        .filter(booking::Column::ClientId.is_in(client_ids.clone()))
        .filter(booking::Column::Status.is_in(BookingStatus::BILLABLE))
        .find_also_related(catalog::Entity)
        .all(db)
        .await?;
    let mut services_used: HashMap<i32, BTreeSet<String>> = HashMap::new();
    for (b, svc) in billable {
        if let Some(svc) = svc {
            services_used.entry(b.client_id).or_default().insert(svc.name);
        }
    }

    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(["Name", "Email", "Phone", "Total Bookings", "Total Spent", "Services Used", "Last Booking", "Created"])
        .map_err(csv_err)?;
    for c in &clients {
        let s = stats.remove(&c.id).unwrap_or_default();
        let services = services_used.remove(&c.id).unwrap_or_default().into_iter().collect::<Vec<_>>().join(", ");
        let last = s.last_booking_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "Never".to_string());
        w.write_record([
            c.name.clone(),
            c.email.clone(),
            c.phone.clone(),
            s.total_bookings.to_string(),
            format_with_symbol(s.total_spent_pence, currency),
            services,
            last,
            clock::to_local(&c.created_at, offset).format("%Y-%m-%d").to_string(),
        ])
        .map_err(csv_err)?;
    }
    info!(event = "clients_exported", rows = clients.len(), "clients_exported");
    Ok(CsvExport { filename: filename("clients", now), body: finish(w)? })
}

/// Bookings matching `filter` (and `ids` when given), in list order.
pub async fn bookings_csv(
    db: &DatabaseConnection,
    policy: &BookingPolicy,
    currency: &str,
    filter: &BookingFilter,
    ids: Option<&[i32]>,
    now: DateTime<FixedOffset>,
) -> ServiceResult<CsvExport> {
    let unpaged = BookingFilter { page: None, per_page: None, ..filter.clone() };
    let rows = find_bookings(db, policy, &unpaged, ids).await?;
    let rows = views(db, policy, rows).await?;
    let offset = policy.rules.offset;

    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "Booking ID", "Client Name", "Client Email", "Client Phone", "Service", "Staff", "Date", "Start Time", "End Time", "Duration",
        "Price", "Status", "Notes", "Created",
    ])
    .map_err(csv_err)?;
    for b in &rows {
        let end = clock::to_local(&b.end_time, offset);
        let created = clock::to_local(&b.created_at, offset);
        w.write_record([
            b.id.to_string(),
            b.client_name.clone(),
            b.client_email.clone(),
            b.client_phone.clone(),
            b.service_name.clone(),
            b.staff_name.clone(),
            b.date.format("%Y-%m-%d").to_string(),
            b.time.clone(),
            end.format("%H:%M").to_string(),
            format!("{} min", b.duration_minutes),
            format!("{}{}", currency, b.price),
            b.status.to_string(),
            b.notes.clone(),
            created.format("%Y-%m-%d %H:%M").to_string(),
        ])
        .map_err(csv_err)?;
    }
    info!(event = "bookings_exported", rows = rows.len(), "bookings_exported");
    Ok(CsvExport { filename: filename("bookings", now), body: finish(w)? })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::client_service::{create_client, ClientInput};
    use crate::test_support::{get_db, seed_booking, seed_service, seed_staff};
    use chrono::TimeZone;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2030, 5, 1, 14, 30, 5).unwrap()
    }

    fn client(name: &str, email: &str) -> ClientInput {
        ClientInput { name: name.into(), email: email.into(), phone: "0777".into(), notes: String::new(), marketing_consent: false }
    }

    #[test]
    fn ids_parse_and_reject_garbage() {
        assert_eq!(parse_ids(None).unwrap(), None);
        assert_eq!(parse_ids(Some("  ")).unwrap(), None);
        assert_eq!(parse_ids(Some("1, 2,3,")).unwrap(), Some(vec![1, 2, 3]));
        assert!(parse_ids(Some("1,x")).is_err());
    }

    #[test]
    fn filenames_carry_timestamp() {
        assert_eq!(filename("clients", now()), "clients_20300501_143005.csv");
    }

    #[tokio::test]
    async fn clients_export_totals_and_never() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let yoga = seed_service(&db, "Yoga", 60, 2500).await?;
        let reiki = seed_service(&db, "Reiki", 30, 2000).await?;
        let staff = seed_staff(&db, "Aly", "aly@example.com").await?;
        let jo = create_client(&db, client("Jo", "jo@example.com")).await?;
        create_client(&db, client("Sam", "sam@example.com")).await?;
        seed_booking(&db, jo.id, yoga.id, staff.id, "2030-01-07T09:00:00+00:00", BookingStatus::Confirmed).await?;
        seed_booking(&db, jo.id, reiki.id, staff.id, "2030-01-08T09:00:00+00:00", BookingStatus::Completed).await?;
        seed_booking(&db, jo.id, yoga.id, staff.id, "2030-01-09T09:00:00+00:00", BookingStatus::Cancelled).await?;

        let out = clients_csv(&db, "£", None, now()).await?;
        let lines: Vec<&str> = out.body.lines().collect();
        assert_eq!(lines[0], "Name,Email,Phone,Total Bookings,Total Spent,Services Used,Last Booking,Created");
        assert!(lines[1].starts_with("Jo,jo@example.com,0777,2,£45.00,\"Reiki, Yoga\",2030-01-08,"));
        assert!(lines[2].starts_with("Sam,sam@example.com,0777,0,£0.00,,Never,"));

        let only_sam = clients_csv(&db, "£", Some(&[jo.id + 1]), now()).await?;
        assert_eq!(only_sam.body.lines().count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn clients_export_uses_local_dates() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let yoga = seed_service(&db, "Yoga", 60, 2500).await?;
        let staff = seed_staff(&db, "Aly", "aly@example.com").await?;
        let jo = create_client(&db, client("Jo", "jo@example.com")).await?;
        // 23:30 UTC on the 7th
        seed_booking(&db, jo.id, yoga.id, staff.id, "2030-01-08T01:30:00+02:00", BookingStatus::Confirmed).await?;

        let east = FixedOffset::east_opt(2 * 3600).unwrap().with_ymd_and_hms(2030, 5, 1, 14, 30, 5).unwrap();
        let out = clients_csv(&db, "£", None, east).await?;
        let row = out.body.lines().nth(1).unwrap_or_default().to_string();
        assert!(row.contains(",2030-01-08,"), "{}", row);

        let out = clients_csv(&db, "£", None, now()).await?;
        let row = out.body.lines().nth(1).unwrap_or_default().to_string();
        assert!(row.contains(",2030-01-07,"), "{}", row);
        Ok(())
    }

    #[tokio::test]
    async fn bookings_export_rows() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let policy = BookingPolicy::from_config(&configs::BookingConfig::default())?;
        let yoga = seed_service(&db, "Yoga", 60, 2500).await?;
        let staff = seed_staff(&db, "Aly", "aly@example.com").await?;
        let jo = create_client(&db, client("Jo", "jo@example.com")).await?;
        let b = seed_booking(&db, jo.id, yoga.id, staff.id, "2030-01-07T09:00:00+00:00", BookingStatus::Confirmed).await?;

        let out = bookings_csv(&db, &policy, "£", &BookingFilter::default(), None, now()).await?;
        assert_eq!(out.filename, "bookings_20300501_143005.csv");
        let row = out.body.lines().nth(1).unwrap_or_default().to_string();
        let expected = format!("{},Jo,jo@example.com,0777,Yoga,Aly,2030-01-07,09:00,10:00,60 min,£25.00,confirmed,,", b.id);
        assert!(row.starts_with(&expected), "{}", row);
        Ok(())
    }
}

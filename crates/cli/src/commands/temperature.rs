//! Temperature reading commands.

use chrono::{FixedOffset, NaiveDate};

use shiftwatch_client::projection::{filter_readings, latest_per_device};
use shiftwatch_core::page::MAX_PAGE_SIZE;
use shiftwatch_core::wire::CreateTemperatureRequest;
use shiftwatch_core::{TemperatureReading, TemperatureReadingId};

use super::{CommandError, Context, parse_id};

/// Arguments of `temperature list`.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub device: Option<String>,
    pub filter: Option<String>,
    pub day: Option<NaiveDate>,
}

/// One table row.
fn row(reading: &TemperatureReading, tz: FixedOffset) -> String {
    let temperature = reading
        .temperature
        .map_or_else(|| "  --  ".to_owned(), |t| format!("{t:>6.1}"));
    format!(
        "{:>5}  {}  {:<16} {:<20} {} {}",
        reading.id,
        reading.recorded_at.with_timezone(&tz).format("%d/%m/%Y %H:%M"),
        reading.device_id,
        reading.environment,
        temperature,
        if reading.fan_engaged { "ventilador" } else { "" },
    )
}

/// List a page of readings, optionally narrowed on the client side.
pub async fn list(ctx: &Context, query: &ListQuery) -> Result<(), CommandError> {
    let page = match &query.device {
        Some(device) => {
            ctx.client
                .list_device_temperature(device, query.page, query.limit)
                .await?
        }
        None => ctx.client.list_temperature(query.page, query.limit).await?,
    };

    let tz = ctx.config.display_offset;
    let shown = filter_readings(
        &page.items,
        query.filter.as_deref().unwrap_or_default(),
        query.day,
        tz,
    );

    #[allow(clippy::print_stdout)]
    {
        if shown.is_empty() {
            println!("Sin lecturas");
        }
        for reading in &shown {
            println!("{}", row(reading, tz));
        }
        println!("Página {} de {}", query.page, page.total_pages.max(1));
    }
    Ok(())
}

/// Show one reading.
pub async fn show(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let id: TemperatureReadingId = parse_id(id)?;
    let reading = ctx.client.get_temperature(id).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", row(&reading, ctx.config.display_offset));
    }
    Ok(())
}

/// Latest reading of one device.
pub async fn latest(ctx: &Context, device: &str) -> Result<(), CommandError> {
    let reading = ctx.client.latest_for_device(device).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", row(&reading, ctx.config.display_offset));
    }
    Ok(())
}

/// Latest reading of every device in the most recent page.
pub async fn devices(ctx: &Context) -> Result<(), CommandError> {
    let page = ctx.client.list_temperature(1, MAX_PAGE_SIZE).await?;
    let tz = ctx.config.display_offset;

    #[allow(clippy::print_stdout)]
    {
        for reading in latest_per_device(&page.items) {
            println!("{}", row(reading, tz));
        }
    }
    Ok(())
}

/// Record a reading.
pub async fn add(
    ctx: &Context,
    device: &str,
    environment: &str,
    temperature: Option<f64>,
) -> Result<(), CommandError> {
    let reading = ctx
        .client
        .create_temperature(&CreateTemperatureRequest {
            environment: Some(environment.to_owned()),
            device_id: Some(device.to_owned()),
            temperature,
        })
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", row(&reading, ctx.config.display_offset));
    }
    Ok(())
}

/// Delete a reading.
pub async fn delete(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let id: TemperatureReadingId = parse_id(id)?;
    let message = ctx.client.delete_temperature(id).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{message}");
    }
    Ok(())
}

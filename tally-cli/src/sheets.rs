use anyhow::{Context, Result, bail};
use google_sheets4::Sheets;
use google_sheets4::api::{
    AddSheetRequest, AutoResizeDimensionsRequest, BatchUpdateSpreadsheetRequest, CellData,
    CellFormat, Color, DimensionRange, GridCoordinate, GridProperties, GridRange, NumberFormat,
    PivotGroup, PivotTable, PivotValue, RepeatCellRequest, Request, RowData, SheetProperties,
    TextFormat, UpdateCellsRequest, UpdateSheetPropertiesRequest, ValueRange,
};
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use tally_core::LedgerTable;

use crate::state::ensure_tally_home;

// IMPORTANT: use the oauth2 version re-exported by google-sheets4 to avoid version mismatches.
use google_sheets4::oauth2;

type SheetsHub = Sheets<HttpsConnector<HttpConnector>>;

/// Published table shape: Date, Item, Category, Debit, Credit.
const COLUMN_COUNT: i32 = 5;
const CATEGORY_COLUMN: i32 = 2;
const DEBIT_COLUMN: i32 = 3;
const CREDIT_COLUMN: i32 = 4;
/// The table always lands at the top-left cell of the target worksheet.
const ANCHOR: &str = "A1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthClient {
    pub client_id: String,
    pub client_secret: String,
    /// Defaults to https://accounts.google.com/o/oauth2/auth
    pub auth_uri: Option<String>,
    /// Defaults to https://oauth2.googleapis.com/token
    pub token_uri: Option<String>,
    /// Defaults to ["http://localhost"]
    pub redirect_uris: Option<Vec<String>>,
}

pub struct PublishOptions {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub pivot_sheet: String,
    pub format: bool,
    pub pivot: bool,
}

fn oauth_client_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("google_oauth.json"))
}

fn token_cache_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("google_token_cache.json"))
}

pub fn save_oauth_client(client: &GoogleOAuthClient) -> Result<()> {
    let p = oauth_client_path()?;
    fs::write(&p, serde_json::to_string_pretty(client)?)
        .with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn load_oauth_client() -> Result<GoogleOAuthClient> {
    let p = oauth_client_path()?;
    if !p.exists() {
        bail!(
            "Missing Google OAuth client config at {}. Run: tally connect",
            p.display()
        );
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

/// Interactive connect:
/// - user pastes client_id/client_secret from Google Cloud Console (Desktop app)
/// - we run the OAuth installed-app flow
/// - tokens cached under ~/.tally/google_token_cache.json
pub async fn connect_interactive() -> Result<()> {
    println!("Google Sheets connect\n");
    println!("This uses the official Google Sheets API.\n");
    println!("You need to create OAuth credentials once:\n");
    println!("1) Go to: https://console.cloud.google.com/apis/credentials");
    println!("2) Create credentials → OAuth client ID");
    println!("3) Application type: Desktop app");
    println!("4) Copy client_id + client_secret\n");

    let client_id = prompt("Paste client_id")?;
    let client_secret = prompt("Paste client_secret")?;

    if !client_id.contains('.') || client_secret.len() < 10 {
        bail!("client_id/client_secret didn't look valid");
    }

    let client = GoogleOAuthClient {
        client_id,
        client_secret,
        auth_uri: Some("https://accounts.google.com/o/oauth2/auth".to_string()),
        token_uri: Some("https://oauth2.googleapis.com/token".to_string()),
        redirect_uris: Some(vec!["http://localhost".to_string()]),
    };

    save_oauth_client(&client)?;

    // Run OAuth flow (installed app) and cache token.
    let _hub = hub_from_client(&client).await?;

    println!("\nConnected. Tokens cached at: {}", token_cache_path()?.display());
    Ok(())
}

async fn hub_from_client(client: &GoogleOAuthClient) -> Result<SheetsHub> {
    // yup-oauth2 expects the same structure as Google "installed" client secrets.
    let installed = oauth2::ApplicationSecret {
        client_id: client.client_id.clone(),
        client_secret: client.client_secret.clone(),
        auth_uri: client
            .auth_uri
            .clone()
            .unwrap_or_else(|| "https://accounts.google.com/o/oauth2/auth".to_string()),
        token_uri: client
            .token_uri
            .clone()
            .unwrap_or_else(|| "https://oauth2.googleapis.com/token".to_string()),
        redirect_uris: client
            .redirect_uris
            .clone()
            .unwrap_or_else(|| vec!["http://localhost".to_string()]),
        ..Default::default()
    };

    let token_path = token_cache_path()?;
    let auth = oauth2::InstalledFlowAuthenticator::builder(
        installed,
        oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .persist_tokens_to_disk(token_path)
    .build()
    .await
    .context("building oauth authenticator")?;

    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .https_or_http()
        .enable_http1()
        .build();
    let hub = Sheets::new(hyper::Client::builder().build(connector), auth);
    Ok(hub)
}

fn prompt(label: &str) -> Result<String> {
    use std::io::{self, Write};
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Upload the table, then optionally format it and build the pivot view.
pub async fn publish_table(table: &LedgerTable, opts: &PublishOptions) -> Result<()> {
    let client = load_oauth_client()?;
    let hub = hub_from_client(&client).await?;

    let rows = table.rows();
    let sheet_id = resolve_sheet_id(&hub, &opts.spreadsheet_id, &opts.sheet_name)
        .await?
        .with_context(|| format!("no sheet named {:?} in spreadsheet", opts.sheet_name))?;

    upload_values(&hub, opts, &rows).await?;
    log::info!("uploaded {} rows to sheet {}", rows.len(), opts.sheet_name);

    if opts.format {
        let req = BatchUpdateSpreadsheetRequest {
            requests: Some(format_requests(sheet_id, rows.len())),
            ..Default::default()
        };
        hub.spreadsheets()
            .batch_update(req, &opts.spreadsheet_id)
            .doit()
            .await
            .context("applying formatting")?;
    }

    if opts.pivot {
        let pivot_sheet_id =
            match resolve_sheet_id(&hub, &opts.spreadsheet_id, &opts.pivot_sheet).await? {
                Some(id) => id,
                None => add_sheet(&hub, &opts.spreadsheet_id, &opts.pivot_sheet).await?,
            };
        let req = BatchUpdateSpreadsheetRequest {
            requests: Some(vec![pivot_request(sheet_id, pivot_sheet_id, rows.len())]),
            ..Default::default()
        };
        hub.spreadsheets()
            .batch_update(req, &opts.spreadsheet_id)
            .doit()
            .await
            .context("creating pivot table")?;
    }

    Ok(())
}

async fn resolve_sheet_id(
    hub: &SheetsHub,
    spreadsheet_id: &str,
    title: &str,
) -> Result<Option<i32>> {
    let (_, spreadsheet) = hub
        .spreadsheets()
        .get(spreadsheet_id)
        .doit()
        .await
        .with_context(|| format!("fetching spreadsheet {}", spreadsheet_id))?;

    Ok(spreadsheet
        .sheets
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| s.properties)
        .find(|p| p.title.as_deref() == Some(title))
        .and_then(|p| p.sheet_id))
}

async fn add_sheet(hub: &SheetsHub, spreadsheet_id: &str, title: &str) -> Result<i32> {
    let req = BatchUpdateSpreadsheetRequest {
        requests: Some(vec![Request {
            add_sheet: Some(AddSheetRequest {
                properties: Some(SheetProperties {
                    title: Some(title.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ..Default::default()
    };

    let (_, resp) = hub
        .spreadsheets()
        .batch_update(req, spreadsheet_id)
        .doit()
        .await
        .with_context(|| format!("adding sheet {:?}", title))?;

    resp.replies
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| r.add_sheet)
        .filter_map(|r| r.properties)
        .filter_map(|p| p.sheet_id)
        .next()
        .context("add-sheet reply carried no sheet id")
}

async fn upload_values(hub: &SheetsHub, opts: &PublishOptions, rows: &[Vec<String>]) -> Result<()> {
    let range = format!("{}!{}", opts.sheet_name, ANCHOR);
    let req = value_range(&range, rows);
    hub.spreadsheets()
        .values_update(req, &opts.spreadsheet_id, &range)
        .value_input_option("USER_ENTERED")
        .doit()
        .await
        .with_context(|| format!("updating values at {}", range))?;
    Ok(())
}

fn value_range(range: &str, rows: &[Vec<String>]) -> ValueRange {
    let values = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| serde_json::Value::String(cell.clone()))
                .collect()
        })
        .collect();

    ValueRange {
        range: Some(range.to_string()),
        major_dimension: Some("ROWS".to_string()),
        values: Some(values),
    }
}

/// Formatting applied after upload: bold tinted frozen header, number
/// format on the amount columns, auto-sized columns.
fn format_requests(sheet_id: i32, row_count: usize) -> Vec<Request> {
    let header_cell = CellData {
        user_entered_format: Some(CellFormat {
            background_color: Some(Color {
                red: Some(0.85),
                green: Some(0.9),
                blue: Some(0.95),
                alpha: None,
            }),
            text_format: Some(TextFormat {
                bold: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    let amount_cell = CellData {
        user_entered_format: Some(CellFormat {
            number_format: Some(NumberFormat {
                type_: Some("NUMBER".to_string()),
                pattern: Some("#,##0.00".to_string()),
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    vec![
        Request {
            repeat_cell: Some(RepeatCellRequest {
                range: Some(GridRange {
                    sheet_id: Some(sheet_id),
                    start_row_index: Some(0),
                    end_row_index: Some(1),
                    start_column_index: Some(0),
                    end_column_index: Some(COLUMN_COUNT),
                }),
                cell: Some(header_cell),
                fields: Some("userEnteredFormat(backgroundColor,textFormat)".parse().unwrap()),
            }),
            ..Default::default()
        },
        Request {
            update_sheet_properties: Some(UpdateSheetPropertiesRequest {
                properties: Some(SheetProperties {
                    sheet_id: Some(sheet_id),
                    grid_properties: Some(GridProperties {
                        frozen_row_count: Some(1),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                fields: Some("gridProperties.frozenRowCount".parse().unwrap()),
            }),
            ..Default::default()
        },
        Request {
            repeat_cell: Some(RepeatCellRequest {
                range: Some(GridRange {
                    sheet_id: Some(sheet_id),
                    start_row_index: Some(1),
                    end_row_index: Some(row_count as i32),
                    start_column_index: Some(DEBIT_COLUMN),
                    end_column_index: Some(COLUMN_COUNT),
                }),
                cell: Some(amount_cell),
                fields: Some("userEnteredFormat.numberFormat".parse().unwrap()),
            }),
            ..Default::default()
        },
        Request {
            auto_resize_dimensions: Some(AutoResizeDimensionsRequest {
                dimensions: Some(DimensionRange {
                    sheet_id: Some(sheet_id),
                    dimension: Some("COLUMNS".to_string()),
                    start_index: Some(0),
                    end_index: Some(COLUMN_COUNT),
                }),
                data_source_sheet_dimensions: None,
            }),
            ..Default::default()
        },
    ]
}

/// Write a pivot table at the top-left of the pivot worksheet.
fn pivot_request(source_sheet_id: i32, pivot_sheet_id: i32, row_count: usize) -> Request {
    Request {
        update_cells: Some(UpdateCellsRequest {
            start: Some(GridCoordinate {
                sheet_id: Some(pivot_sheet_id),
                row_index: Some(0),
                column_index: Some(0),
            }),
            rows: Some(vec![RowData {
                values: Some(vec![CellData {
                    pivot_table: Some(pivot_spec(source_sheet_id, row_count)),
                    ..Default::default()
                }]),
            }]),
            fields: Some("pivotTable".parse().unwrap()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Pivot over the published table: rows grouped by Category, SUM of Debit
/// and Credit. Column offsets follow the fixed table shape.
fn pivot_spec(source_sheet_id: i32, row_count: usize) -> PivotTable {
    PivotTable {
        source: Some(GridRange {
            sheet_id: Some(source_sheet_id),
            start_row_index: Some(0),
            end_row_index: Some(row_count as i32),
            start_column_index: Some(0),
            end_column_index: Some(COLUMN_COUNT),
        }),
        rows: Some(vec![PivotGroup {
            source_column_offset: Some(CATEGORY_COLUMN),
            sort_order: Some("ASCENDING".to_string()),
            show_totals: Some(true),
            ..Default::default()
        }]),
        values: Some(vec![
            PivotValue {
                source_column_offset: Some(DEBIT_COLUMN),
                summarize_function: Some("SUM".to_string()),
                name: Some("Debit".to_string()),
                ..Default::default()
            },
            PivotValue {
                source_column_offset: Some(CREDIT_COLUMN),
                summarize_function: Some("SUM".to_string()),
                name: Some("Credit".to_string()),
                ..Default::default()
            },
        ]),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<String>> {
        vec![
            vec!["Date", "Item", "Category", "Debit", "Credit"],
            vec!["01/01/2024", "Rent", "Housing", "1000", "0"],
            vec!["02/01/2024", "Salary", "Income", "0", "2000"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(str::to_string).collect())
        .collect()
    }

    #[test]
    fn test_value_range_covers_all_rows() {
        let vr = value_range("Sheet1!A1", &rows());
        assert_eq!(vr.range.as_deref(), Some("Sheet1!A1"));
        assert_eq!(vr.major_dimension.as_deref(), Some("ROWS"));

        let values = vr.values.unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1][2], serde_json::Value::String("Housing".into()));
    }

    #[test]
    fn test_format_targets_header_and_amount_columns() {
        let reqs = format_requests(7, 3);

        let header = reqs[0].repeat_cell.as_ref().unwrap();
        let range = header.range.as_ref().unwrap();
        assert_eq!(range.sheet_id, Some(7));
        assert_eq!((range.start_row_index, range.end_row_index), (Some(0), Some(1)));

        let frozen = reqs[1].update_sheet_properties.as_ref().unwrap();
        let grid = frozen
            .properties
            .as_ref()
            .unwrap()
            .grid_properties
            .as_ref()
            .unwrap();
        assert_eq!(grid.frozen_row_count, Some(1));

        let amounts = reqs[2].repeat_cell.as_ref().unwrap();
        let range = amounts.range.as_ref().unwrap();
        assert_eq!(range.start_column_index, Some(DEBIT_COLUMN));
        assert_eq!(range.end_column_index, Some(COLUMN_COUNT));
    }

    #[test]
    fn test_pivot_groups_by_category_and_sums_amounts() {
        let pivot = pivot_spec(7, 3);

        let source = pivot.source.as_ref().unwrap();
        assert_eq!(source.sheet_id, Some(7));
        assert_eq!(source.end_row_index, Some(3));
        assert_eq!(source.end_column_index, Some(COLUMN_COUNT));

        let groups = pivot.rows.as_ref().unwrap();
        assert_eq!(groups[0].source_column_offset, Some(CATEGORY_COLUMN));

        let values = pivot.values.as_ref().unwrap();
        let offsets: Vec<_> = values.iter().map(|v| v.source_column_offset).collect();
        assert_eq!(offsets, vec![Some(DEBIT_COLUMN), Some(CREDIT_COLUMN)]);
        assert!(values.iter().all(|v| v.summarize_function.as_deref() == Some("SUM")));
    }

    #[test]
    fn test_pivot_lands_on_pivot_sheet() {
        let req = pivot_request(7, 9, 3);
        let cells = req.update_cells.as_ref().unwrap();
        assert_eq!(cells.start.as_ref().unwrap().sheet_id, Some(9));
        assert_eq!(cells.fields.as_deref(), Some("pivotTable"));
    }
}

//! Per-interaction session: the current data source, table, chart
//! selection and the last figure or error.

use crate::charts::{
    ChartDispatcher, ChartError, ChartKind, ChartOptions, ChartRequest, Figure,
    StaticChartRenderer,
};
use crate::config::AppConfig;
use crate::data::{DataLoader, ManualGrid, ParseError, Table};
use strum::{Display, EnumIter};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("No data loaded")]
    NoData,
    #[error("No chart to export")]
    NoFigure,
}

/// Where the table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum DataSource {
    #[default]
    #[strum(serialize = "Upload File")]
    Upload,
    #[strum(serialize = "Manual Entry")]
    Manual,
}

/// Chart kind plus column selections, by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
    /// Heatmap cell column.
    pub value: Option<String>,
}

impl Selection {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    source: DataSource,
    file_name: Option<String>,
    table: Option<Table>,
    selection: Selection,
    options: ChartOptions,
    figure: Option<Figure>,
    error: Option<String>,
}

impl Session {
    pub fn new(options: ChartOptions, kind: ChartKind) -> Self {
        Self {
            options,
            selection: Selection::new(kind),
            ..Default::default()
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.chart_options(), config.default_chart)
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    /// Switch data source; the current table belongs to the old source.
    pub fn set_source(&mut self, source: DataSource) {
        if self.source != source {
            self.source = source;
            self.file_name = None;
            self.discard();
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    /// Message of the last failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn discard(&mut self) {
        self.table = None;
        self.figure = None;
        self.error = None;
    }

    fn fail<T>(&mut self, err: SessionError) -> Result<T, SessionError> {
        warn!(error = %err, "session error");
        self.error = Some(err.to_string());
        Err(err)
    }

    /// Parse an uploaded file into the session table.
    pub fn load_file(&mut self, file_name: &str, bytes: &[u8]) -> Result<&Table, SessionError> {
        self.source = DataSource::Upload;
        self.discard();
        self.file_name = Some(file_name.to_string());

        match DataLoader::load_named(file_name, bytes) {
            Ok(table) => {
                info!(
                    file = file_name,
                    rows = table.height(),
                    columns = table.width(),
                    "loaded file"
                );
                Ok(&*self.table.insert(table))
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Build the session table from a manual grid.
    pub fn build_manual(&mut self, grid: &ManualGrid) -> Result<&Table, SessionError> {
        self.source = DataSource::Manual;
        self.discard();

        match grid.build() {
            Ok(table) => {
                info!(rows = table.height(), columns = table.width(), "built manual table");
                Ok(&*self.table.insert(table))
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Replace the chart selection; a different selection drops the old figure.
    pub fn select(&mut self, selection: Selection) {
        if self.selection != selection {
            self.selection = selection;
            self.figure = None;
        }
    }

    pub fn select_kind(&mut self, kind: ChartKind) {
        let selection = Selection {
            kind,
            ..self.selection.clone()
        };
        self.select(selection);
    }

    /// Dispatch the current selection against the current table.
    pub fn visualize(&mut self) -> Result<&Figure, SessionError> {
        self.figure = None;
        let Some(table) = self.table.as_ref() else {
            return self.fail(SessionError::NoData);
        };

        let request = ChartRequest {
            table,
            kind: self.selection.kind,
            x: self.selection.x.as_deref(),
            y: self.selection.y.as_deref(),
            value: self.selection.value.as_deref(),
        };
        match ChartDispatcher::dispatch(&request, &self.options) {
            Ok(figure) => {
                info!(kind = %figure.kind, series = %figure.series_name, "chart ready");
                self.error = None;
                Ok(&*self.figure.insert(figure))
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// SVG document of the current figure.
    pub fn export_svg(&self, width: u32, height: u32) -> Result<String, SessionError> {
        let figure = self.figure.as_ref().ok_or(SessionError::NoFigure)?;
        Ok(StaticChartRenderer::render_svg(figure, width, height)?)
    }
}

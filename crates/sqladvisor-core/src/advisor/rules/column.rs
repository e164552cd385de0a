//! Column definition rules for the MySQL family

use tracing::debug;

use crate::advice::Code;
use crate::advisor::checker::{CheckContext, ColumnRule, ColumnSite};
use crate::error::AdvisorError;
use crate::version::EngineVersion;

/// AUTO_INCREMENT columns must be UNSIGNED
pub struct AutoIncrementMustUnsigned;

impl ColumnRule for AutoIncrementMustUnsigned {
    fn check_column(&mut self, site: &ColumnSite<'_>, ctx: &mut CheckContext<'_>) {
        if site.field.is_auto_increment() && !site.field.is_unsigned() {
            ctx.report(
                Code::AutoIncrementColumnSigned,
                format!(
                    "Auto-increment column `{}`.`{}` is not UNSIGNED type",
                    site.table, site.column
                ),
                site.field.line,
            );
        }
    }
}

/// AUTO_INCREMENT columns must have an integer type
pub struct AutoIncrementMustInteger;

impl ColumnRule for AutoIncrementMustInteger {
    fn check_column(&mut self, site: &ColumnSite<'_>, ctx: &mut CheckContext<'_>) {
        let Some(data_type) = &site.field.data_type else {
            return;
        };
        if site.field.is_auto_increment() && !data_type.is_integer() {
            ctx.report(
                Code::AutoIncrementColumnNotInteger,
                format!(
                    "Auto-increment column `{}`.`{}` requires integer type, found {}",
                    site.table, site.column, data_type.name
                ),
                site.field.line,
            );
        }
    }
}

/// Release that deprecated ZEROFILL when no `min_version` is configured
const ZEROFILL_DEPRECATED_SINCE: &str = "8.0.17";

/// ZEROFILL is deprecated on newer MySQL releases
pub struct DisallowZerofill;

impl ColumnRule for DisallowZerofill {
    fn begin(&mut self, ctx: &mut CheckContext<'_>) -> Result<bool, AdvisorError> {
        let min_raw = ctx
            .rule()
            .payload_str("min_version")?
            .unwrap_or(ZEROFILL_DEPRECATED_SINCE);
        let minimum = EngineVersion::parse(min_raw)
            .map_err(|e| ctx.invalid_configuration(format!("min_version: {}", e)))?;

        match ctx.parsed_engine_version() {
            Ok(None) => Ok(true),
            Ok(Some(version)) => {
                let applies = version.at_least(&minimum);
                debug!(%version, %minimum, applies, "zerofill version gate");
                Ok(applies)
            }
            Err(AdvisorError::UnrecognizedVersionFormat(e)) => {
                ctx.report_at(Code::UnrecognizedEngineVersion, e.to_string(), 0);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn check_column(&mut self, site: &ColumnSite<'_>, ctx: &mut CheckContext<'_>) {
        let Some(data_type) = &site.field.data_type else {
            return;
        };
        if data_type.options.zerofill {
            ctx.report(
                Code::ColumnZerofillDeprecated,
                format!(
                    "Column `{}`.`{}` uses deprecated ZEROFILL attribute",
                    site.table, site.column
                ),
                data_type.line,
            );
        }
    }
}

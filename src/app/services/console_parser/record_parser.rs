//! Record assembly from tokenized console rows
//!
//! An assembler walks its layout table, decoding each field from its token
//! position. What a decode failure does is decided by the field's
//! [`FailurePolicy`]: `DropRecord` aborts assembly, `Sentinel` records the
//! failure and carries on, so the row still yields exactly one (possibly
//! degraded) record.

use super::layout::{FailurePolicy, FieldSpec, FieldValue, battery, power};
use crate::app::models::{BaseState, BatteryRecord, PowerRecord, RecordKind};
use crate::constants::SENTINEL;
use crate::{Error, Result};

/// A record together with the supplementary fields that failed to decode
#[derive(Debug)]
pub struct Assembled<T> {
    pub record: T,
    pub degraded: Vec<Error>,
}

/// A record type that can be assembled from one console row
pub trait ConsoleRecord: Sized {
    const KIND: RecordKind;

    /// Minimum number of tokens a row needs
    const MIN_TOKENS: usize;

    /// Assemble a record from an already tokenized data row
    ///
    /// Fails with [`Error::IncompleteRow`] when the row is too short and with
    /// [`Error::FieldDecode`] when a critical field cannot be decoded.
    fn from_tokens(tokens: &[&str]) -> Result<Assembled<Self>>;
}

impl ConsoleRecord for BatteryRecord {
    const KIND: RecordKind = RecordKind::Battery;
    const MIN_TOKENS: usize = battery::MIN_TOKENS;

    fn from_tokens(tokens: &[&str]) -> Result<Assembled<Self>> {
        ensure_min_tokens(tokens, Self::MIN_TOKENS)?;
        let mut row = RowReader::new(tokens);

        let record = BatteryRecord {
            id: row.integer(&battery::ID)?.unwrap_or(SENTINEL),
            volt: row.integer(&battery::VOLT)?.unwrap_or(SENTINEL),
            curr: row.integer(&battery::CURR)?.unwrap_or(SENTINEL),
            temp: row.integer(&battery::TEMP)?.unwrap_or(SENTINEL),
            base_state: row.state(&battery::BASE_STATE)?,
            volt_state: row.text(&battery::VOLT_STATE)?,
            curr_state: row.text(&battery::CURR_STATE)?,
            temp_state: row.text(&battery::TEMP_STATE)?,
            soc: row.percentage(&battery::SOC)?,
            coulomb: row.integer(&battery::COULOMB)?,
            bal: row.text(&battery::BAL)?,
        };

        Ok(row.finish(record))
    }
}

impl ConsoleRecord for PowerRecord {
    const KIND: RecordKind = RecordKind::Power;
    const MIN_TOKENS: usize = power::MIN_TOKENS;

    fn from_tokens(tokens: &[&str]) -> Result<Assembled<Self>> {
        ensure_min_tokens(tokens, Self::MIN_TOKENS)?;
        let mut row = RowReader::new(tokens);

        let record = PowerRecord {
            id: row.integer(&power::ID)?.unwrap_or(SENTINEL),
            volt: row.integer(&power::VOLT)?.unwrap_or(SENTINEL),
            curr: row.integer(&power::CURR)?.unwrap_or(SENTINEL),
            temp: row.integer(&power::TEMP)?.unwrap_or(SENTINEL),
            base_state: row.state(&power::BASE_STATE)?,
            volt_state: row.text(&power::VOLT_STATE)?,
            curr_state: row.text(&power::CURR_STATE)?,
            temp_state: row.text(&power::TEMP_STATE)?,
            coulomb: row.percentage(&power::COULOMB)?,
            bv_state: row.text(&power::BV_STATE)?,
            bt_state: row.text(&power::BT_STATE)?,
            mos_temp: row.text(&power::MOS_TEMP)?,
            mt_state: row.text(&power::MT_STATE)?,
        };

        Ok(row.finish(record))
    }
}

fn ensure_min_tokens(tokens: &[&str], required: usize) -> Result<()> {
    if tokens.len() < required {
        return Err(Error::incomplete_row(tokens.len(), required));
    }
    Ok(())
}

/// Reads typed fields from one row, applying each field's failure policy
///
/// `Ok(None)` means the field failed under a non-dropping policy. An `Err`
/// means the row must be dropped.
pub(super) struct RowReader<'a> {
    tokens: &'a [&'a str],
    degraded: Vec<Error>,
}

impl<'a> RowReader<'a> {
    pub(super) fn new(tokens: &'a [&'a str]) -> Self {
        Self {
            tokens,
            degraded: Vec::new(),
        }
    }

    fn read<T>(
        &mut self,
        spec: &FieldSpec,
        extract: impl FnOnce(FieldValue) -> std::result::Result<T, FieldValue>,
    ) -> Result<Option<T>> {
        let decoded = spec
            .decode(self.tokens)
            .and_then(|value| extract(value).map_err(|other| layout_mismatch(spec, &other)));

        match decoded {
            Ok(value) => Ok(Some(value)),
            Err(e) => match spec.policy {
                FailurePolicy::DropRecord => Err(e),
                FailurePolicy::Sentinel => {
                    self.degraded.push(e);
                    Ok(None)
                }
                FailurePolicy::Infallible => Ok(None),
            },
        }
    }

    /// Integer or capacity field
    pub(super) fn integer(&mut self, spec: &FieldSpec) -> Result<Option<i32>> {
        self.read(spec, |value| match value {
            FieldValue::Integer(n) | FieldValue::Capacity(n) => Ok(n),
            other => Err(other),
        })
    }

    pub(super) fn percentage(&mut self, spec: &FieldSpec) -> Result<Option<i8>> {
        self.read(spec, |value| match value {
            FieldValue::Percentage(n) => Ok(n),
            other => Err(other),
        })
    }

    pub(super) fn state(&mut self, spec: &FieldSpec) -> Result<BaseState> {
        let state = self.read(spec, |value| match value {
            FieldValue::State(state) => Ok(state),
            other => Err(other),
        })?;
        Ok(state.unwrap_or(BaseState::Unknown))
    }

    pub(super) fn text(&mut self, spec: &FieldSpec) -> Result<String> {
        let text = self.read(spec, |value| match value {
            FieldValue::Text(text) => Ok(text),
            other => Err(other),
        })?;
        Ok(text.unwrap_or_default())
    }

    pub(super) fn finish<T>(self, record: T) -> Assembled<T> {
        Assembled {
            record,
            degraded: self.degraded,
        }
    }
}

fn layout_mismatch(spec: &FieldSpec, value: &FieldValue) -> Error {
    Error::field_decode(
        spec.name,
        format!("{:?}", value),
        format!("layout decoder {:?} does not produce this field's type", spec.decoder),
    )
}

//! The fixed fact vocabulary tracked for one conversation.
//!
//! Every fact is tri-state: `None` is unknown, `Some(false)` / `Some(true)`
//! (or `Some(value)`) is present. Unknown is never read as "no".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One tracked fact. Serialized with the camelCase names the WhatsApp
/// integration stores in its session records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    DebtAmount,
    HasOverdue12Months,
    MonthlyIncome,
    EmploymentType,
    IncomeStability,
    HasProperty,
    HasCar,
    HasCollateral,
    CollateralType,
    HasCollectorPressure,
    HasAccountArrest,
    HasWageArrest,
    PreviousRejection,
    CreditorsCount,
}

#[derive(Debug, Clone, Error)]
#[error("unknown field name: {0}")]
pub struct UnknownName(pub String);

impl Field {
    pub const ALL: [Field; 14] = [
        Field::DebtAmount,
        Field::HasOverdue12Months,
        Field::MonthlyIncome,
        Field::EmploymentType,
        Field::IncomeStability,
        Field::HasProperty,
        Field::HasCar,
        Field::HasCollateral,
        Field::CollateralType,
        Field::HasCollectorPressure,
        Field::HasAccountArrest,
        Field::HasWageArrest,
        Field::PreviousRejection,
        Field::CreditorsCount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::DebtAmount => "debtAmount",
            Field::HasOverdue12Months => "hasOverdue12Months",
            Field::MonthlyIncome => "monthlyIncome",
            Field::EmploymentType => "employmentType",
            Field::IncomeStability => "incomeStability",
            Field::HasProperty => "hasProperty",
            Field::HasCar => "hasCar",
            Field::HasCollateral => "hasCollateral",
            Field::CollateralType => "collateralType",
            Field::HasCollectorPressure => "hasCollectorPressure",
            Field::HasAccountArrest => "hasAccountArrest",
            Field::HasWageArrest => "hasWageArrest",
            Field::PreviousRejection => "previousRejection",
            Field::CreditorsCount => "creditorsCount",
        }
    }

    /// Human label used in summaries shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Field::DebtAmount => "Сумма долга",
            Field::HasOverdue12Months => "Просрочка более 12 месяцев",
            Field::MonthlyIncome => "Ежемесячный доход",
            Field::EmploymentType => "Трудоустройство",
            Field::IncomeStability => "Стабильность дохода",
            Field::HasProperty => "Недвижимость в собственности",
            Field::HasCar => "Автомобиль",
            Field::HasCollateral => "Залоговое имущество",
            Field::CollateralType => "Тип залога",
            Field::HasCollectorPressure => "Давление коллекторов",
            Field::HasAccountArrest => "Арест счетов",
            Field::HasWageArrest => "Удержания из зарплаты",
            Field::PreviousRejection => "Предыдущий отказ в банкротстве",
            Field::CreditorsCount => "Количество кредиторов",
        }
    }

    /// Placeholder shown instead of a value when the fact is unknown.
    /// Agrees in gender and number with [`Field::label`].
    pub fn unknown_placeholder(self) -> &'static str {
        match self {
            Field::DebtAmount
            | Field::HasOverdue12Months
            | Field::IncomeStability
            | Field::HasProperty => "не указана",
            Field::MonthlyIncome
            | Field::HasCar
            | Field::CollateralType
            | Field::HasAccountArrest
            | Field::PreviousRejection => "не указан",
            Field::HasWageArrest => "не указаны",
            Field::EmploymentType
            | Field::HasCollateral
            | Field::HasCollectorPressure
            | Field::CreditorsCount => "не указано",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

// ── Enumerated fact values ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    Official,
    Unofficial,
    Government,
    Retired,
    Unemployed,
    SelfEmployed,
    MaternityLeave,
}

impl EmploymentType {
    pub fn label(self) -> &'static str {
        match self {
            EmploymentType::Official => "официальное трудоустройство",
            EmploymentType::Unofficial => "неофициальное трудоустройство",
            EmploymentType::Government => "государственная служба",
            EmploymentType::Retired => "пенсионер",
            EmploymentType::Unemployed => "не работает",
            EmploymentType::SelfEmployed => "ИП / самозанятость",
            EmploymentType::MaternityLeave => "декретный отпуск",
        }
    }
}

impl FromStr for EmploymentType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "official" => Ok(Self::Official),
            "unofficial" => Ok(Self::Unofficial),
            "government" => Ok(Self::Government),
            "retired" => Ok(Self::Retired),
            "unemployed" => Ok(Self::Unemployed),
            "self_employed" => Ok(Self::SelfEmployed),
            "maternity_leave" => Ok(Self::MaternityLeave),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeStability {
    Stable,
    Unstable,
}

impl IncomeStability {
    pub fn label(self) -> &'static str {
        match self {
            IncomeStability::Stable => "стабильный",
            IncomeStability::Unstable => "нестабильный",
        }
    }
}

impl FromStr for IncomeStability {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stable" => Ok(Self::Stable),
            "unstable" => Ok(Self::Unstable),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollateralType {
    Mortgage,
    AutoLoan,
    Other,
}

impl CollateralType {
    pub fn label(self) -> &'static str {
        match self {
            CollateralType::Mortgage => "ипотека",
            CollateralType::AutoLoan => "автокредит",
            CollateralType::Other => "другое",
        }
    }
}

impl FromStr for CollateralType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mortgage" => Ok(Self::Mortgage),
            "auto_loan" => Ok(Self::AutoLoan),
            "other" => Ok(Self::Other),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

// ── Generic view of a single value ──────────────────────────────────────

/// A known fact value, independent of which field holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactValue {
    Amount(u64),
    Count(u32),
    Flag(bool),
    Employment(EmploymentType),
    Stability(IncomeStability),
    Collateral(CollateralType),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Amount(amount) => write!(f, "{} тенге", group_thousands(*amount)),
            FactValue::Count(count) => write!(f, "{count}"),
            FactValue::Flag(true) => f.write_str("да"),
            FactValue::Flag(false) => f.write_str("нет"),
            FactValue::Employment(kind) => f.write_str(kind.label()),
            FactValue::Stability(kind) => f.write_str(kind.label()),
            FactValue::Collateral(kind) => f.write_str(kind.label()),
        }
    }
}

/// Format an integer with a space between groups of three digits
/// (`5907200` → `5 907 200`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

// ── Facts ───────────────────────────────────────────────────────────────

/// Typed record of every tracked fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_overdue_12_months: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_stability: Option<IncomeStability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_property: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_car: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_collateral: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_type: Option<CollateralType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_collector_pressure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_account_arrest: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_wage_arrest: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_rejection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creditors_count: Option<u32>,
}

impl Facts {
    pub fn get(&self, field: Field) -> Option<FactValue> {
        match field {
            Field::DebtAmount => self.debt_amount.map(FactValue::Amount),
            Field::HasOverdue12Months => self.has_overdue_12_months.map(FactValue::Flag),
            Field::MonthlyIncome => self.monthly_income.map(FactValue::Amount),
            Field::EmploymentType => self.employment_type.map(FactValue::Employment),
            Field::IncomeStability => self.income_stability.map(FactValue::Stability),
            Field::HasProperty => self.has_property.map(FactValue::Flag),
            Field::HasCar => self.has_car.map(FactValue::Flag),
            Field::HasCollateral => self.has_collateral.map(FactValue::Flag),
            Field::CollateralType => self.collateral_type.map(FactValue::Collateral),
            Field::HasCollectorPressure => self.has_collector_pressure.map(FactValue::Flag),
            Field::HasAccountArrest => self.has_account_arrest.map(FactValue::Flag),
            Field::HasWageArrest => self.has_wage_arrest.map(FactValue::Flag),
            Field::PreviousRejection => self.previous_rejection.map(FactValue::Flag),
            Field::CreditorsCount => self.creditors_count.map(FactValue::Count),
        }
    }

    pub fn is_known(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Fields that currently hold a value, in vocabulary order.
    pub fn known_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| self.is_known(*f)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.known_fields().is_empty()
    }

    /// Copy one field's value (known or not) from `other`.
    pub fn copy_field(&mut self, other: &Facts, field: Field) {
        match field {
            Field::DebtAmount => self.debt_amount = other.debt_amount,
            Field::HasOverdue12Months => self.has_overdue_12_months = other.has_overdue_12_months,
            Field::MonthlyIncome => self.monthly_income = other.monthly_income,
            Field::EmploymentType => self.employment_type = other.employment_type,
            Field::IncomeStability => self.income_stability = other.income_stability,
            Field::HasProperty => self.has_property = other.has_property,
            Field::HasCar => self.has_car = other.has_car,
            Field::HasCollateral => self.has_collateral = other.has_collateral,
            Field::CollateralType => self.collateral_type = other.collateral_type,
            Field::HasCollectorPressure => self.has_collector_pressure = other.has_collector_pressure,
            Field::HasAccountArrest => self.has_account_arrest = other.has_account_arrest,
            Field::HasWageArrest => self.has_wage_arrest = other.has_wage_arrest,
            Field::PreviousRejection => self.previous_rejection = other.previous_rejection,
            Field::CreditorsCount => self.creditors_count = other.creditors_count,
        }
    }

    /// Store `value` under `field`. Returns `false`, leaving the facts
    /// untouched, when the value is of the wrong kind for the field.
    pub fn set(&mut self, field: Field, value: FactValue) -> bool {
        match (field, value) {
            (Field::DebtAmount, FactValue::Amount(v)) => self.debt_amount = Some(v),
            (Field::MonthlyIncome, FactValue::Amount(v)) => self.monthly_income = Some(v),
            (Field::CreditorsCount, FactValue::Count(v)) => self.creditors_count = Some(v),
            (Field::EmploymentType, FactValue::Employment(v)) => self.employment_type = Some(v),
            (Field::IncomeStability, FactValue::Stability(v)) => self.income_stability = Some(v),
            (Field::CollateralType, FactValue::Collateral(v)) => self.collateral_type = Some(v),
            (Field::HasOverdue12Months, FactValue::Flag(v)) => self.has_overdue_12_months = Some(v),
            (Field::HasProperty, FactValue::Flag(v)) => self.has_property = Some(v),
            (Field::HasCar, FactValue::Flag(v)) => self.has_car = Some(v),
            (Field::HasCollateral, FactValue::Flag(v)) => self.has_collateral = Some(v),
            (Field::HasCollectorPressure, FactValue::Flag(v)) => self.has_collector_pressure = Some(v),
            (Field::HasAccountArrest, FactValue::Flag(v)) => self.has_account_arrest = Some(v),
            (Field::HasWageArrest, FactValue::Flag(v)) => self.has_wage_arrest = Some(v),
            (Field::PreviousRejection, FactValue::Flag(v)) => self.previous_rejection = Some(v),
            _ => return false,
        }
        true
    }

    /// Forget a field, returning it to the unknown state.
    pub fn clear(&mut self, field: Field) {
        self.copy_field(&Facts::default(), field);
    }
}

use crate::error::Result;
use crate::transform::{
    transform_customers, transform_employees, transform_products, transform_sales,
};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::fmt;

/// The tables of the retail dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Categories,
    Cities,
    Customers,
    Employees,
    Products,
    Sales,
    Countries,
}

impl Entity {
    /// Every entity, in the order a run processes them.
    pub const ALL: [Self; 7] = [
        Self::Categories,
        Self::Cities,
        Self::Customers,
        Self::Employees,
        Self::Products,
        Self::Sales,
        Self::Countries,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Categories => "categories.csv",
            Self::Cities => "cities.csv",
            Self::Customers => "customers.csv",
            Self::Employees => "employees.csv",
            Self::Products => "products.csv",
            Self::Sales => "sales.csv",
            Self::Countries => "countries.csv",
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            Self::Categories => "Categories",
            Self::Cities => "Cities",
            Self::Customers => "Customers",
            Self::Employees => "Employees",
            Self::Products => "Products",
            Self::Sales => "Sales",
            Self::Countries => "Countries",
        }
    }

    /// Applies this entity's cleaning rules. Lookup tables pass through.
    pub fn transform(self, df: DataFrame) -> Result<DataFrame> {
        match self {
            Self::Customers => transform_customers(df),
            Self::Employees => transform_employees(df),
            Self::Products => transform_products(df),
            Self::Sales => transform_sales(df),
            Self::Categories | Self::Cities | Self::Countries => Ok(df),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

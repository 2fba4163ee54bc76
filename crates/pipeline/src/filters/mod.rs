//! Hard-constraint filter implementations.
//!
//! Each filter checks one criterion and passes its input through untouched
//! when that criterion is unset.

pub mod price_range;
pub mod fuel;
pub mod brand;
pub mod body_type;
pub mod transmission;
pub mod year_range;

pub use price_range::PriceRangeFilter;
pub use fuel::FuelFilter;
pub use brand::BrandFilter;
pub use body_type::BodyTypeFilter;
pub use transmission::TransmissionFilter;
pub use year_range::YearRangeFilter;

#[cfg(test)]
pub(crate) mod fixtures {
    use catalog::Item;

    pub fn car(
        id: u32,
        brand: &str,
        fuel: &str,
        price: f64,
        year: u16,
        transmission: &str,
        body_type: &str,
    ) -> Item {
        Item {
            id,
            brand: brand.to_string(),
            model: format!("Model {}", id),
            power: 110,
            fuel: fuel.to_string(),
            price,
            year,
            transmission: transmission.to_string(),
            body_type: body_type.to_string(),
        }
    }

    pub fn create_test_items() -> Vec<Item> {
        vec![
            car(1, "Audi", "Petrol", 23_000.0, 2019, "Automatic", "Sedan"),
            car(2, "BMW", "Diesel", 35_000.0, 2021, "Manual", "Station"),
            car(3, "Toyota", "Plug-in Hybrid", 28_000.0, 2022, "CVT", "SUV"),
            car(4, "Volkswagen", "Gasoline", 15_000.0, 2016, "Manual", "Hatchback"),
            car(5, "Volvo", "Electric", 45_000.0, 2023, "", "Crossover"),
        ]
    }

    pub fn ids(items: &[&Item]) -> Vec<u32> {
        items.iter().map(|item| item.id).collect()
    }
}

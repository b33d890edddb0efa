//! Static string tables for the storefront UI.
//!
//! Localization here is deliberately just table swapping: the visitor's
//! language code is persisted under a session key and every page render
//! picks the matching [`Catalog`]. There is no message formatting, no
//! pluralization engine, no runtime loading.

use serde::{Deserialize, Serialize};

/// Supported UI languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Hi,
}

impl Lang {
    /// All supported languages, for the language picker.
    pub const ALL: [Self; 2] = [Self::En, Self::Hi];

    /// The two-letter language code persisted in the session.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
        }
    }

    /// Native display name for the language picker.
    #[must_use]
    pub const fn native_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "हिन्दी",
        }
    }

    /// The string table for this language.
    #[must_use]
    pub const fn catalog(&self) -> &'static Catalog {
        match self {
            Self::En => &EN,
            Self::Hi => &HI,
        }
    }
}

impl std::str::FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "hi" => Ok(Self::Hi),
            other => Err(format!("unsupported language code: {other}")),
        }
    }
}

/// UI strings for one language.
///
/// Fields are grouped the way the pages use them; adding a language means
/// adding one more `const` table below.
#[derive(Debug)]
pub struct Catalog {
    // Navbar
    pub nav_home: &'static str,
    pub nav_products: &'static str,
    pub nav_categories: &'static str,
    pub nav_cart: &'static str,
    pub nav_wishlist: &'static str,
    pub nav_orders: &'static str,
    pub nav_profile: &'static str,
    pub nav_login: &'static str,
    pub nav_logout: &'static str,
    pub nav_register: &'static str,
    pub nav_search_placeholder: &'static str,
    pub nav_language: &'static str,

    // Products
    pub product_add_to_cart: &'static str,
    pub product_out_of_stock: &'static str,

    // Home
    pub home_featured: &'static str,
    pub home_trending: &'static str,
    pub home_free_shipping_note: &'static str,

    // Cart & checkout
    pub cart_title: &'static str,
    pub cart_empty: &'static str,
    pub cart_subtotal: &'static str,
    pub cart_shipping: &'static str,
    pub cart_shipping_free: &'static str,
    pub cart_tax: &'static str,
    pub cart_grand_total: &'static str,
    pub cart_checkout: &'static str,
    pub checkout_title: &'static str,
    pub checkout_address: &'static str,
    pub checkout_phone: &'static str,
    pub checkout_place_order: &'static str,

    // Orders
    pub orders_title: &'static str,
    pub orders_empty: &'static str,
    pub order_cancel: &'static str,
    pub order_cancelled: &'static str,
    pub order_invoice: &'static str,

    // Wishlist
    pub wishlist_title: &'static str,
    pub wishlist_empty: &'static str,

    // Errors
    pub error_generic: &'static str,
    pub error_not_found: &'static str,
}

static EN: Catalog = Catalog {
    nav_home: "Home",
    nav_products: "Products",
    nav_categories: "Shop by Category",
    nav_cart: "Cart",
    nav_wishlist: "Wishlist",
    nav_orders: "My Orders",
    nav_profile: "My Profile",
    nav_login: "Login",
    nav_logout: "Logout",
    nav_register: "Register",
    nav_search_placeholder: "Search for products",
    nav_language: "Language",

    product_add_to_cart: "Add to Cart",
    product_out_of_stock: "Out of stock",

    home_featured: "Featured Products",
    home_trending: "Trending Products",
    home_free_shipping_note: "Free shipping on orders above ₹999",

    cart_title: "Your Cart",
    cart_empty: "Your cart is empty",
    cart_subtotal: "Subtotal",
    cart_shipping: "Shipping",
    cart_shipping_free: "FREE",
    cart_tax: "Tax (18%)",
    cart_grand_total: "Total Amount",
    cart_checkout: "Proceed to Checkout",
    checkout_title: "Checkout",
    checkout_address: "Shipping Address",
    checkout_phone: "Phone Number",
    checkout_place_order: "Place Order",

    orders_title: "My Orders",
    orders_empty: "You haven't placed any orders yet",
    order_cancel: "Cancel Order",
    order_cancelled: "Cancelled",
    order_invoice: "Download Invoice",

    wishlist_title: "My Wishlist",
    wishlist_empty: "Your wishlist is empty",

    error_generic: "Something went wrong. Please try again.",
    error_not_found: "We couldn't find what you were looking for.",
};

static HI: Catalog = Catalog {
    nav_home: "होम",
    nav_products: "उत्पाद",
    nav_categories: "श्रेणी से खरीदें",
    nav_cart: "कार्ट",
    nav_wishlist: "विशलिस्ट",
    nav_orders: "मेरे ऑर्डर",
    nav_profile: "मेरी प्रोफ़ाइल",
    nav_login: "लॉगिन",
    nav_logout: "लॉगआउट",
    nav_register: "रजिस्टर करें",
    nav_search_placeholder: "उत्पाद खोजें",
    nav_language: "भाषा",

    product_add_to_cart: "कार्ट में डालें",
    product_out_of_stock: "स्टॉक में नहीं",

    home_featured: "चुनिंदा उत्पाद",
    home_trending: "ट्रेंडिंग उत्पाद",
    home_free_shipping_note: "₹999 से अधिक के ऑर्डर पर मुफ़्त शिपिंग",

    cart_title: "आपका कार्ट",
    cart_empty: "आपका कार्ट खाली है",
    cart_subtotal: "उप-योग",
    cart_shipping: "शिपिंग",
    cart_shipping_free: "मुफ़्त",
    cart_tax: "कर (18%)",
    cart_grand_total: "कुल राशि",
    cart_checkout: "चेकआउट करें",
    checkout_title: "चेकआउट",
    checkout_address: "शिपिंग पता",
    checkout_phone: "फ़ोन नंबर",
    checkout_place_order: "ऑर्डर करें",

    orders_title: "मेरे ऑर्डर",
    orders_empty: "आपने अभी तक कोई ऑर्डर नहीं किया है",
    order_cancel: "ऑर्डर रद्द करें",
    order_cancelled: "रद्द",
    order_invoice: "इनवॉइस डाउनलोड करें",

    wishlist_title: "मेरी विशलिस्ट",
    wishlist_empty: "आपकी विशलिस्ट खाली है",

    error_generic: "कुछ गड़बड़ हो गई। कृपया फिर से प्रयास करें।",
    error_not_found: "हमें वह नहीं मिला जिसकी आप तलाश कर रहे थे।",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_code_roundtrip() {
        for lang in Lang::ALL {
            assert_eq!(lang.code().parse::<Lang>().ok(), Some(lang));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!("fr".parse::<Lang>().is_err());
    }

    #[test]
    fn test_catalogs_differ() {
        assert_ne!(Lang::En.catalog().cart_title, Lang::Hi.catalog().cart_title);
    }
}

//! Stylesheet and script for the HTML log viewer, baked in at compile time.

/// Embeds each viewer asset and generates a lookup by file name.
macro_rules! embedded_assets {
    ($($path:literal => $const_name:ident),* $(,)?) => {
        $(
            pub const $const_name: &str = include_str!(concat!("../../assets/", $path));
        )*

        pub fn get_asset(path: &str) -> Option<&'static str> {
            match path {
                $( $path => Some($const_name), )*
                _ => None,
            }
        }

        pub fn list_assets() -> Vec<&'static str> {
            vec![ $( $path, )* ]
        }
    };
}

embedded_assets! {
    "viewer.css" => VIEWER_CSS,
    "viewer.js" => VIEWER_JS,
}

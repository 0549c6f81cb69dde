use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: fretmidi <request.yaml> [output.mid]");
        eprintln!("       fretmidi --content <library.yaml> <request.yaml> [output.mid]");
        process::exit(1);
    }

    let mut content_path: Option<&String> = None;
    let mut request_path = &args[1];
    let mut output_path: Option<&String> = args.get(2);

    // Parse flags
    if args[1] == "--content" {
        if args.len() < 4 {
            eprintln!("Usage: fretmidi --content <library.yaml> <request.yaml> [output.mid]");
            process::exit(1);
        }
        content_path = Some(&args[2]);
        request_path = &args[3];
        output_path = args.get(4);
    }

    // Read the render request
    let request_doc = match fs::read_to_string(request_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", request_path, e);
            process::exit(1);
        }
    };
    let request: fretmidi::RenderRequest = match serde_yaml::from_str(&request_doc) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error in request '{}': {}", request_path, e);
            process::exit(1);
        }
    };

    // Load the content catalog when one was given
    let library: fretmidi::ContentLibrary = match content_path {
        Some(path) => {
            let doc = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading file '{}': {}", path, e);
                    process::exit(1);
                }
            };
            match serde_yaml::from_str(&doc) {
                Ok(library) => library,
                Err(e) => {
                    eprintln!("Error in content library '{}': {}", path, e);
                    process::exit(1);
                }
            }
        }
        None => fretmidi::ContentLibrary::default(),
    };

    // Render
    let bytes = match fretmidi::render(&request, &library) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Render error: {}", e);
            process::exit(1);
        }
    };
    if bytes.is_empty() {
        eprintln!("Nothing to render for this request");
        process::exit(0);
    }

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &bytes) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote {} bytes of MIDI to {}", bytes.len(), path);
        }
        None => {
            if let Err(e) = io::stdout().write_all(&bytes) {
                eprintln!("Error writing to stdout: {}", e);
                process::exit(1);
            }
        }
    }
}

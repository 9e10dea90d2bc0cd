use std::io::Write;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::widget::ChatWidget;

pub async fn run(url: String, token: String) -> Result<()> {
    let mut rl = DefaultEditor::new().expect("Editor failed");
    let mut widget = ChatWidget::new(&url, &token);

    println!("Hi! Ask me about our analytics and automation services.");

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let mut printed = 0;
                widget
                    .send(&line, |text| {
                        // Print only the newly arrived part of the message
                        print!("{}", &text[printed..]);
                        printed = text.len();
                        let _ = std::io::stdout().flush();
                    })
                    .await;
                println!();

                if let Some(last) = widget.messages().last()
                    && last.show_contact_form
                {
                    println!(
                        "-- Want pricing details? Share your contact info on the website and we'll follow up. --"
                    );
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
